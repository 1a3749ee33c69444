//! Gmail API integration
//!
//! This module provides:
//! - OAuth2 authorization-code flow and token refresh
//! - Gmail API client for listing messages and fetching their headers
//! - Normalization of message headers into search result records

mod auth;
mod client;
mod error;
mod normalize;

pub use auth::{
    Authenticator, CredentialStatus, GoogleTokenEndpoint, InsecureTransportError, TokenEndpoint,
};
pub use client::{GmailClient, MailApi};
pub use error::ProviderError;
pub use normalize::{
    NO_SENDER, NO_SUBJECT, SUMMARY_HEADERS, format_header_date, message_url, parse_header_date,
    summarize,
};

/// Gmail API and OAuth wire types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// Response from listing messages
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListMessagesResponse {
        pub messages: Option<Vec<MessageRef>>,
    }

    /// Reference to a message in a listing
    #[derive(Debug, Deserialize)]
    pub struct MessageRef {
        pub id: String,
    }

    /// Message fetched with `format=metadata`
    #[derive(Debug, Deserialize)]
    pub struct MetadataMessage {
        pub payload: Option<MessagePayload>,
    }

    /// Message payload; only headers are present in metadata responses
    #[derive(Debug, Deserialize)]
    pub struct MessagePayload {
        pub headers: Option<Vec<Header>>,
    }

    /// Email header (name-value pair)
    #[derive(Debug, Deserialize, Serialize)]
    pub struct Header {
        pub name: String,
        pub value: String,
    }

    /// Error envelope returned by Google APIs
    #[derive(Debug, Deserialize)]
    pub struct ErrorResponse {
        pub error: ErrorBody,
    }

    #[derive(Debug, Deserialize)]
    pub struct ErrorBody {
        pub message: String,
    }

    /// Token response from the OAuth token endpoint
    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct TokenResponse {
        pub access_token: String,
        pub refresh_token: Option<String>,
        pub expires_in: Option<u64>,
        /// Space-separated scopes actually granted
        pub scope: Option<String>,
    }

    /// Error body returned by the OAuth token endpoint
    #[derive(Debug, Deserialize)]
    pub struct OAuthErrorResponse {
        pub error: String,
        pub error_description: Option<String>,
    }
}
