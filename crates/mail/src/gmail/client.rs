//! Gmail API HTTP client
//!
//! Lists messages matching a search query and fetches selected headers.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::api::{ListMessagesResponse, MetadataMessage};
use super::error::ProviderError;
use crate::config::MAX_RESULTS;
use crate::models::{Credential, MessageHeaders, MessageId};

/// The subset of the Gmail API used by search
pub trait MailApi: Send + Sync {
    /// List IDs of messages matching `query`, in the order Gmail returns them
    ///
    /// `max_results` is clamped to `1..=MAX_RESULTS`.
    fn list_message_ids(
        &self,
        credential: &Credential,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<MessageId>>;

    /// Fetch only the named headers of a message
    ///
    /// Headers the message does not carry are absent from the result.
    fn get_headers(
        &self,
        credential: &Credential,
        id: &MessageId,
        header_names: &[&str],
    ) -> Result<MessageHeaders>;
}

impl<M: MailApi + ?Sized> MailApi for std::sync::Arc<M> {
    fn list_message_ids(
        &self,
        credential: &Credential,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<MessageId>> {
        (**self).list_message_ids(credential, query, max_results)
    }

    fn get_headers(
        &self,
        credential: &Credential,
        id: &MessageId,
        header_names: &[&str],
    ) -> Result<MessageHeaders> {
        (**self).get_headers(credential, id, header_names)
    }
}

/// Gmail API client
pub struct GmailClient {
    base_url: String,
    agent: ureq::Agent,
}

impl Default for GmailClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Create a client for the public Gmail API
    pub fn new() -> Self {
        Self::with_base_url(Self::BASE_URL)
    }

    /// Create a client against a different API root
    pub fn with_base_url(base_url: &str) -> Self {
        // Error statuses are read as responses so the provider's message survives
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }
}

impl MailApi for GmailClient {
    fn list_message_ids(
        &self,
        credential: &Credential,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<MessageId>> {
        let url = format!("{}/users/me/messages", self.base_url);
        // Gmail treats 0 as "use the default page size", which exceeds the cap
        let limit = max_results.clamp(1, MAX_RESULTS);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &format!("Bearer {}", credential.access_token))
            .query("q", query)
            .query("maxResults", limit.to_string())
            .call()
            .context("Failed to send list messages request")?;

        let list: ListMessagesResponse = read_json(response, "list messages")?;

        Ok(list
            .messages
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .map(|m| MessageId::new(m.id))
            .collect())
    }

    fn get_headers(
        &self,
        credential: &Credential,
        id: &MessageId,
        header_names: &[&str],
    ) -> Result<MessageHeaders> {
        let url = format!(
            "{}/users/me/messages/{}",
            self.base_url,
            urlencoding::encode(id.as_str())
        );

        let mut request = self
            .agent
            .get(&url)
            .header("Authorization", &format!("Bearer {}", credential.access_token))
            .query("format", "metadata");
        for name in header_names {
            request = request.query("metadataHeaders", *name);
        }

        let response = request
            .call()
            .context("Failed to send get message request")?;

        let message: MetadataMessage = read_json(response, "message metadata")?;

        let headers = message
            .payload
            .and_then(|p| p.headers)
            .unwrap_or_default()
            .into_iter()
            .filter(|h| header_names.iter().any(|n| h.name.eq_ignore_ascii_case(n)))
            .map(|h| (h.name, h.value));

        Ok(MessageHeaders::from_pairs(headers))
    }
}

/// Decode a successful JSON response, or turn an error status into a [`ProviderError`]
fn read_json<T: DeserializeOwned>(
    mut response: ureq::http::Response<ureq::Body>,
    what: &str,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.body_mut().read_to_string().unwrap_or_default();
        return Err(ProviderError::from_api_body(status.as_u16(), &body).into());
    }

    response
        .body_mut()
        .read_json()
        .with_context(|| format!("Failed to parse {} response", what))
}
