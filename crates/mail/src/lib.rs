//! Mail crate - Business logic for Gmail search
//!
//! This crate provides platform-independent functionality including:
//! - Domain models (Credential, MessageId, MessageSummary)
//! - Credential storage abstractions
//! - Gmail OAuth authentication and API client
//! - Search orchestration for UI consumption
//!
//! This crate has zero HTTP server dependencies; the web front end lives in
//! the `beacon` app.

pub mod config;
pub mod gmail;
pub mod models;
pub mod search;
pub mod storage;

pub use config::{AppConfig, GmailCredentials, MAX_RESULTS};
pub use gmail::{
    Authenticator, CredentialStatus, GmailClient, GoogleTokenEndpoint, InsecureTransportError,
    MailApi, ProviderError, TokenEndpoint,
};
pub use models::{Credential, MessageHeaders, MessageId, MessageSummary};
pub use search::{SearchOutcome, SearchService};
pub use storage::{CredentialStore, FileCredentialStore, InMemoryCredentialStore};
