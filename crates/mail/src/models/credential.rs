//! OAuth credential model
//!
//! Serialized in Google's "authorized user" JSON layout so token files written
//! by other Google client libraries can be read back and vice versa.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Access token bundle granting Gmail API access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token sent with API requests
    #[serde(rename = "token")]
    pub access_token: String,
    /// Long-lived token used to mint new access tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Scopes granted to this token
    #[serde(default)]
    pub scopes: Vec<String>,
    /// When the access token stops being accepted (None = no known expiry)
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// Tokens this close to expiry are treated as already expired
    pub const EXPIRY_SKEW_SECS: i64 = 300;

    /// Create a credential holding only an access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_uri: None,
            client_id: None,
            client_secret: None,
            scopes: Vec::new(),
            expiry: None,
        }
    }

    /// Check whether the access token has expired (or is about to)
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check expiry against an explicit clock reading
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now + Duration::seconds(Self::EXPIRY_SKEW_SECS) >= expiry,
            None => false,
        }
    }

    /// A credential is usable when it has a token that has not expired
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }

    /// Refresh token, if one was issued and is non-empty
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }
}
