//! Gmail OAuth2 authentication
//!
//! Implements the OAuth2 authorization code flow for a web application: the
//! browser is sent to Google's consent page, Google redirects back to the
//! configured callback with a code, and the code is exchanged for tokens.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use log::{info, warn};
use std::sync::Arc;
use url::Url;

use super::api::TokenResponse;
use super::error::ProviderError;
use crate::config::{AppConfig, GmailCredentials};
use crate::models::Credential;
use crate::storage::CredentialStore;

/// The callback arrived over plain http while insecure transport is disabled
#[derive(Debug, thiserror::Error)]
#[error("OAuth callback must use https (insecure transport is disabled): {url}")]
pub struct InsecureTransportError {
    pub url: String,
}

/// Result of asking for a usable credential
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialStatus {
    /// A valid credential, ready for API calls
    Ready(Credential),
    /// No usable credential; the user must visit this consent URL
    AuthorizationRequired(String),
}

/// The OAuth token endpoint
pub trait TokenEndpoint: Send + Sync {
    /// Exchange an authorization code for tokens
    fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse>;

    /// Mint a new access token from a refresh token
    fn refresh(&self, refresh_token: &str) -> Result<TokenResponse>;
}

/// Token endpoint backed by Google's OAuth2 server
pub struct GoogleTokenEndpoint {
    client_id: String,
    client_secret: String,
    token_url: String,
    agent: ureq::Agent,
}

impl GoogleTokenEndpoint {
    /// Create an endpoint for the given client registration
    pub fn new(registration: &GmailCredentials) -> Self {
        Self::with_token_url(registration, &registration.token_uri)
    }

    /// Create an endpoint that posts to a custom token URL
    pub fn with_token_url(registration: &GmailCredentials, token_url: &str) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            client_id: registration.client_id.clone(),
            client_secret: registration.client_secret.clone(),
            token_url: token_url.to_string(),
            agent,
        }
    }

    fn post_form(&self, form: &[(&str, &str)], action: &str) -> Result<TokenResponse> {
        let mut response = self
            .agent
            .post(&self.token_url)
            .send_form(form.iter().copied())
            .with_context(|| format!("Failed to {}", action))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(ProviderError::from_oauth_body(status.as_u16(), &body).into());
        }

        response
            .body_mut()
            .read_json()
            .context("Failed to parse token response")
    }
}

impl TokenEndpoint for GoogleTokenEndpoint {
    fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse> {
        self.post_form(
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
            ],
            "exchange authorization code",
        )
    }

    fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        self.post_form(
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ],
            "refresh access token",
        )
    }
}

/// Obtains, refreshes and persists the credential used for Gmail API calls
pub struct Authenticator {
    config: Arc<AppConfig>,
    registration: GmailCredentials,
    store: Box<dyn CredentialStore>,
    endpoint: Box<dyn TokenEndpoint>,
}

impl Authenticator {
    pub fn new(
        config: Arc<AppConfig>,
        registration: GmailCredentials,
        store: Box<dyn CredentialStore>,
        endpoint: Box<dyn TokenEndpoint>,
    ) -> Self {
        Self {
            config,
            registration,
            store,
            endpoint,
        }
    }

    /// Get a valid credential, refreshing it if needed
    ///
    /// Returns [`CredentialStatus::AuthorizationRequired`] when nothing is
    /// stored, the stored credential cannot be refreshed, or the refresh is
    /// rejected. Fails only when a refreshed credential cannot be saved.
    pub fn ensure_credential(&self) -> Result<CredentialStatus> {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to load stored credential: {:#}", e);
                None
            }
        };

        if let Some(credential) = stored {
            if credential.is_valid() {
                return Ok(CredentialStatus::Ready(credential));
            }

            if let Some(refresh_token) = credential.refresh_token() {
                match self.endpoint.refresh(refresh_token) {
                    Ok(tokens) => {
                        let refreshed = self.credential_from_tokens(tokens, Some(refresh_token));
                        self.store.save(&refreshed)?;
                        info!("Refreshed access token");
                        return Ok(CredentialStatus::Ready(refreshed));
                    }
                    Err(e) => {
                        warn!("Token refresh failed, re-authorization required: {:#}", e);
                    }
                }
            }
        }

        info!("No usable credential, authorization required");
        Ok(CredentialStatus::AuthorizationRequired(self.authorization_url()))
    }

    /// Build the consent URL the user must visit to grant access
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.registration.auth_uri,
            urlencoding::encode(&self.registration.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&self.config.scopes.join(" ")),
        )
    }

    /// Finish the flow from the full URL Google redirected the browser to
    ///
    /// Exchanges the authorization code for tokens and persists them.
    pub fn complete_authorization(&self, callback_url: &str) -> Result<Credential> {
        let url = Url::parse(callback_url)
            .with_context(|| format!("Invalid callback URL: {}", callback_url))?;

        if url.scheme() != "https" && !self.config.allow_insecure_transport {
            return Err(InsecureTransportError {
                url: callback_url.to_string(),
            }
            .into());
        }

        let mut code = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "error" => bail!("OAuth error: {}", value),
                "code" if code.is_none() => code = Some(value.into_owned()),
                _ => {}
            }
        }
        let code = code.context("No authorization code received")?;

        let tokens = self.endpoint.exchange_code(&code, &self.config.redirect_uri)?;
        let credential = self.credential_from_tokens(tokens, None);
        self.store.save(&credential)?;
        info!("Authorization complete, credential saved");

        Ok(credential)
    }

    fn credential_from_tokens(
        &self,
        tokens: TokenResponse,
        previous_refresh_token: Option<&str>,
    ) -> Credential {
        let scopes = tokens
            .scope
            .map(|s| s.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.config.scopes.clone());

        Credential {
            access_token: tokens.access_token,
            // Google omits the refresh token on refresh responses
            refresh_token: tokens
                .refresh_token
                .or_else(|| previous_refresh_token.map(str::to_string)),
            token_uri: Some(self.registration.token_uri.clone()),
            client_id: Some(self.registration.client_id.clone()),
            client_secret: Some(self.registration.client_secret.clone()),
            scopes,
            // Lifetimes too large to represent are treated as no expiry
            expiry: tokens
                .expires_in
                .and_then(|secs| i64::try_from(secs).ok())
                .and_then(Duration::try_seconds)
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime)),
        }
    }
}
