//! Search orchestration: credential, list, fetch headers, normalize

use anyhow::Result;
use log::{debug, error, info};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::gmail::{Authenticator, CredentialStatus, MailApi, SUMMARY_HEADERS, summarize};
use crate::models::MessageSummary;

/// Result of a search request
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Matching messages, in the order Gmail listed them
    Results(Vec<MessageSummary>),
    /// The user must grant access first; redirect them to this URL
    AuthorizationRequired(String),
}

/// Executes searches against the user's mailbox
pub struct SearchService {
    authenticator: Arc<Authenticator>,
    mail: Box<dyn MailApi>,
    max_results: usize,
}

impl SearchService {
    pub fn new(config: &AppConfig, authenticator: Arc<Authenticator>, mail: Box<dyn MailApi>) -> Self {
        Self {
            authenticator,
            mail,
            max_results: config.effective_max_results(),
        }
    }

    /// Search the mailbox with a Gmail query string (`from:`, `subject:`, ...)
    ///
    /// The query is passed through verbatim. Any provider failure fails the
    /// whole search; partial results are never returned.
    pub fn search(&self, query: &str) -> Result<SearchOutcome> {
        let credential = match self.authenticator.ensure_credential()? {
            CredentialStatus::Ready(credential) => credential,
            CredentialStatus::AuthorizationRequired(url) => {
                return Ok(SearchOutcome::AuthorizationRequired(url));
            }
        };

        debug!("Searching for {:?}", query);
        let ids = self
            .mail
            .list_message_ids(&credential, query, self.max_results)
            .inspect_err(|e| error!("Listing messages failed: {:#}", e))?;

        let mut summaries = Vec::with_capacity(ids.len());
        for id in &ids {
            let headers = self
                .mail
                .get_headers(&credential, id, &SUMMARY_HEADERS)
                .inspect_err(|e| error!("Fetching headers for {} failed: {:#}", id, e))?;
            summaries.push(summarize(id, &headers));
        }

        info!("Search returned {} messages", summaries.len());
        Ok(SearchOutcome::Results(summaries))
    }
}
