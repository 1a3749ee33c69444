//! Storage trait definitions

use crate::models::Credential;
use anyhow::Result;

/// Persistence for the single reusable OAuth credential
///
/// There is no locking or versioning: concurrent writers race and the last
/// write wins.
pub trait CredentialStore: Send + Sync {
    /// Load the stored credential
    ///
    /// Returns `Ok(None)` when nothing usable is stored, including when the
    /// stored record is malformed.
    fn load(&self) -> Result<Option<Credential>>;

    /// Persist a credential, replacing whatever was stored before
    fn save(&self, credential: &Credential) -> Result<()>;
}

impl<S: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<Credential>> {
        (**self).load()
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        (**self).save(credential)
    }
}
