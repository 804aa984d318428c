//! Notices carried across a redirect.

use tower_sessions::Session;

use crate::models::{FlashKind, FlashMessage, session_keys};

/// Notice queue of the current session.
#[derive(Clone)]
pub struct Flash(Session);

impl Flash {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    async fn push(&self, kind: FlashKind, message: impl Into<String>) {
        let mut queue: Vec<FlashMessage> = self
            .0
            .get(session_keys::FLASH)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        queue.push(FlashMessage {
            kind,
            message: message.into(),
        });
        if let Err(e) = self.0.insert(session_keys::FLASH, queue).await {
            tracing::warn!(error = %e, "Failed to store notice");
        }
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.push(FlashKind::Success, message).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.push(FlashKind::Error, message).await;
    }

    /// Remove and return all queued notices.
    pub async fn take(&self) -> Vec<FlashMessage> {
        self.0
            .remove::<Vec<FlashMessage>>(session_keys::FLASH)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}
