//! Domain models for authentication and search results

mod credential;
mod headers;
mod message;

pub use credential::Credential;
pub use headers::MessageHeaders;
pub use message::{MessageId, MessageSummary};
