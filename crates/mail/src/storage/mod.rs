//! Credential storage
//!
//! The trait-based design allows swapping the file-backed store for other
//! backends (keychain, secret manager) and for an in-memory store in tests.

mod file;
mod memory;
mod traits;

pub use file::FileCredentialStore;
pub use memory::InMemoryCredentialStore;
pub use traits::CredentialStore;
