//! Errors reported by Google's servers

use super::api::{ErrorResponse, OAuthErrorResponse};

/// The provider rejected a request (bad query, quota, revoked token, ...)
///
/// Carries the provider's own message so it can be shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    /// HTTP status, when the failure came from an HTTP response
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Build from a Gmail API error body (`{"error": {"message": ...}}`)
    pub(crate) fn from_api_body(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(envelope) => envelope.error.message,
            Err(_) => fallback_message(status, body),
        };
        Self::new(Some(status), message)
    }

    /// Build from an OAuth token endpoint error body (`{"error": "invalid_grant", ...}`)
    pub(crate) fn from_oauth_body(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<OAuthErrorResponse>(body) {
            Ok(OAuthErrorResponse {
                error,
                error_description: Some(description),
            }) => format!("{}: {}", error, description),
            Ok(OAuthErrorResponse { error, .. }) => error,
            Err(_) => fallback_message(status, body),
        };
        Self::new(Some(status), message)
    }
}

fn fallback_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        body.to_string()
    }
}
