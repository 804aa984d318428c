//! One-shot messages carried across a redirect.
//!
//! Handlers queue a message before redirecting; the next rendered page
//! drains the queue into its layout.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{FlashKind, FlashMessage, session_keys};

/// Flash message queue of the current session.
#[derive(Clone)]
pub struct Flash(Session);

impl Flash {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// Queue a message. Failures to write the session are logged and
    /// otherwise ignored.
    pub async fn push(&self, kind: FlashKind, message: impl Into<String>) {
        let mut queue = self.pending().await;
        queue.push(FlashMessage {
            kind,
            message: message.into(),
        });
        if let Err(e) = self.0.insert(session_keys::FLASH, queue).await {
            tracing::warn!(error = %e, "Failed to store flash message");
        }
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.push(FlashKind::Success, message).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.push(FlashKind::Error, message).await;
    }

    pub async fn info(&self, message: impl Into<String>) {
        self.push(FlashKind::Info, message).await;
    }

    /// Remove and return all queued messages.
    pub async fn take(&self) -> Vec<FlashMessage> {
        self.0
            .remove::<Vec<FlashMessage>>(session_keys::FLASH)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    async fn pending(&self) -> Vec<FlashMessage> {
        self.0
            .get::<Vec<FlashMessage>>(session_keys::FLASH)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))
    }
}
