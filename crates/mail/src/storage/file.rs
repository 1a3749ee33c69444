//! JSON file credential store

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::CredentialStore;
use crate::models::Credential;

/// Stores the credential as a single JSON file (e.g. `token.json`)
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            debug!("No stored credential at {}", self.path.display());
            return Ok(None);
        }

        // Unreadable or malformed records force re-authentication
        match config::load_json_file::<Credential>(&self.path) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                warn!("Ignoring unusable credential file: {:#}", e);
                Ok(None)
            }
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        config::save_json_file(&self.path, credential)
            .with_context(|| format!("Failed to persist credential to {}", self.path.display()))?;
        debug!("Saved credential to {}", self.path.display());
        Ok(())
    }
}
