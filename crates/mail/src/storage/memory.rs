//! In-memory credential store
//!
//! Used in tests and for running without touching the filesystem.

use anyhow::Result;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::CredentialStore;
use crate::models::Credential;

#[derive(Default)]
pub struct InMemoryCredentialStore {
    credential: RwLock<Option<Credential>>,
    saves: AtomicUsize,
}

impl InMemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a credential
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: RwLock::new(Some(credential)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of times `save` has been called
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored credential
    pub fn current(&self) -> Option<Credential> {
        self.credential.read().unwrap().clone()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.credential.read().unwrap().clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.credential.write().unwrap() = Some(credential.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
