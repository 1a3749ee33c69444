//! Fakes shared by the route and server tests

use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::routes::App;
use mail::gmail::api::TokenResponse;
use mail::{
    AppConfig, Authenticator, Credential, GmailCredentials, InMemoryCredentialStore, MailApi,
    MessageHeaders, MessageId, ProviderError, SearchService, TokenEndpoint,
};

/// Token endpoint that mints `token-for-<code>`; the code `bad` is rejected
pub struct StaticTokens;

impl TokenEndpoint for StaticTokens {
    fn exchange_code(&self, code: &str, _redirect_uri: &str) -> Result<TokenResponse> {
        if code == "bad" {
            return Err(ProviderError::new(Some(400), "invalid_grant: Malformed auth code.").into());
        }
        Ok(TokenResponse {
            access_token: format!("token-for-{}", code),
            expires_in: Some(3600),
            ..TokenResponse::default()
        })
    }

    fn refresh(&self, _refresh_token: &str) -> Result<TokenResponse> {
        Err(ProviderError::new(Some(400), "invalid_grant").into())
    }
}

/// Mailbox with one message for any non-empty query
pub struct StaticMailbox {
    pub fail_with: Option<&'static str>,
}

impl MailApi for StaticMailbox {
    fn list_message_ids(
        &self,
        _credential: &Credential,
        query: &str,
        _max_results: usize,
    ) -> Result<Vec<MessageId>> {
        if let Some(message) = self.fail_with {
            return Err(ProviderError::new(Some(400), message).into());
        }
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![MessageId::new("m1")])
    }

    fn get_headers(
        &self,
        _credential: &Credential,
        _id: &MessageId,
        _header_names: &[&str],
    ) -> Result<MessageHeaders> {
        Ok(MessageHeaders::from_pairs([
            ("Subject", "Hello"),
            ("Date", "Tue, 15 Mar 2024 09:30:00 -0700 (PDT)"),
        ]))
    }
}

pub fn make_app(
    stored: Option<Credential>,
    mailbox: StaticMailbox,
) -> (App, Arc<InMemoryCredentialStore>) {
    let config = Arc::new(AppConfig::default());
    let store = Arc::new(match stored {
        Some(c) => InMemoryCredentialStore::with_credential(c),
        None => InMemoryCredentialStore::new(),
    });
    let authenticator = Arc::new(Authenticator::new(
        config.clone(),
        GmailCredentials::new("client-id", "client-secret"),
        Box::new(store.clone()),
        Box::new(StaticTokens),
    ));
    let search = SearchService::new(&config, authenticator.clone(), Box::new(mailbox));
    (App::new(config, authenticator, search), store)
}

pub fn signed_in() -> Option<Credential> {
    let mut cred = Credential::new("token");
    cred.expiry = Some(Utc::now() + Duration::hours(1));
    Some(cred)
}
