//! Client error type.

use thiserror::Error;

/// Errors returned by [`ApiClient`](crate::ApiClient) and
/// [`IdentityClient`](crate::IdentityClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status other than 404.
    ///
    /// `message` is the `detail` field of the body when there is one.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Server answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body or URL could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Status code of an error response, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Http(_) | Self::Parse(_) => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Message suitable for a flash message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::NotFound(message) if !message.is_empty() => {
                message.clone()
            }
            Self::Http(_) => "Could not reach the server. Please try again.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        let err = ClientError::Api {
            status: 400,
            message: "Email already registered".into(),
        };
        assert_eq!(err.status(), Some(400));
        assert_eq!(ClientError::NotFound("Cart not found".into()).status(), Some(404));
        assert_eq!(ClientError::Parse("bad".into()).status(), None);
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ClientError::Api {
            status: 400,
            message: "Quantity must be at least 1".into(),
        };
        assert_eq!(err.user_message(), "Quantity must be at least 1");

        let err = ClientError::Api {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }
}
