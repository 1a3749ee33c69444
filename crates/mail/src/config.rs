//! Configuration loading for mail services
//!
//! Two records are involved:
//! - [`GmailCredentials`]: the OAuth client registration, provisioned out of
//!   band in Google Cloud Console format and never written by this crate.
//! - [`AppConfig`]: immutable runtime settings, built once at startup and
//!   passed to the components that need them.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// Optional settings file in the Beacon config directory
const SETTINGS_FILE: &str = "beacon.json";

/// Read-only Gmail scope
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Google OAuth2 endpoints, used when the registration file omits them
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Upper bound on messages returned by one search
pub const MAX_RESULTS: usize = 20;

/// OAuth client registration for Gmail API access
#[derive(Debug, Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

/// Google Cloud Console credential file format
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<RegisteredClient>,
    web: Option<RegisteredClient>,
}

#[derive(Deserialize)]
struct RegisteredClient {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl GmailCredentials {
    /// Create a registration using Google's default endpoints
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_uri: DEFAULT_AUTH_URI.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        }
    }

    /// Load the registration from `path`, falling back to environment variables
    /// when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::from_file(path);
        }
        Self::from_env().with_context(|| {
            format!(
                "No client registration at {} and none in the environment",
                path.display()
            )
        })
    }

    /// Load the registration from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let creds: GoogleCredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(creds)
    }

    /// Parse the registration from JSON (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        // Support both "web" and "installed" (desktop) credential types
        let client = creds
            .web
            .or(creds.installed)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: client.client_id,
            client_secret: client.client_secret,
            auth_uri: client.auth_uri.unwrap_or_else(|| DEFAULT_AUTH_URI.to_string()),
            token_uri: client
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }

    /// Load the registration from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GMAIL_CLIENT_ID")
            .context("GMAIL_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("GMAIL_CLIENT_SECRET")
            .context("GMAIL_CLIENT_SECRET environment variable not set")?;

        Ok(Self::new(client_id, client_secret))
    }
}

/// Runtime settings shared by the authenticator, search service and server
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// Where the provider sends the user after consent
    pub redirect_uri: String,
    /// Scopes requested during consent
    pub scopes: Vec<String>,
    /// Accept OAuth callbacks over plain http. Local development only.
    pub allow_insecure_transport: bool,
    /// Stored credential file
    pub token_path: PathBuf,
    /// Client registration file
    pub client_secrets_path: PathBuf,
    /// Messages fetched per search (capped at [`MAX_RESULTS`])
    pub max_results: usize,
    /// Open the search page in the system browser on startup
    pub open_browser: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            redirect_uri: "http://localhost:5000/oauth2callback".to_string(),
            scopes: vec![GMAIL_READONLY_SCOPE.to_string()],
            allow_insecure_transport: true,
            token_path: PathBuf::from("token.json"),
            client_secrets_path: PathBuf::from("credentials.json"),
            max_results: MAX_RESULTS,
            open_browser: false,
        }
    }
}

impl AppConfig {
    /// Load settings from ~/.config/beacon/beacon.json, or defaults when absent
    pub fn load() -> Result<Self> {
        match config::config_path(SETTINGS_FILE) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file, or defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = if path.exists() {
            config::load_json_file::<Self>(path)?
        } else {
            Self::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json).context("Failed to parse settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the settings are internally consistent
    pub fn validate(&self) -> Result<()> {
        let redirect = self.redirect_url()?;
        if redirect.host_str().is_none() {
            bail!("redirect_uri has no host: {}", self.redirect_uri);
        }
        if self.scopes.is_empty() {
            bail!("At least one OAuth scope is required");
        }
        if self.max_results == 0 {
            bail!("max_results must be at least 1");
        }
        Ok(())
    }

    pub fn redirect_url(&self) -> Result<Url> {
        Url::parse(&self.redirect_uri)
            .with_context(|| format!("Invalid redirect_uri: {}", self.redirect_uri))
    }

    /// Messages to request per search, within `1..=MAX_RESULTS`
    pub fn effective_max_results(&self) -> usize {
        self.max_results.clamp(1, MAX_RESULTS)
    }
}
