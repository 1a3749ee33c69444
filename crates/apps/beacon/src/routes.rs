//! Request routing
//!
//! Maps (method, path+query) to a response without touching sockets, so the
//! whole HTTP surface can be exercised in unit tests.

use anyhow::{Context, Result};
use log::error;
use serde_json::json;
use std::sync::Arc;

use crate::assets;
use mail::{AppConfig, Authenticator, ProviderError, SearchOutcome, SearchService};

/// A fully rendered HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    fn html(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: Some("text/html; charset=utf-8"),
            location: None,
            body: body.into(),
        }
    }

    fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            location: None,
            body: value.to_string().into_bytes(),
        }
    }

    fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            content_type: None,
            location: Some(location.into()),
            body: Vec::new(),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, &json!({ "error": message }))
    }
}

/// Application state shared by all routes
pub struct App {
    config: Arc<AppConfig>,
    authenticator: Arc<Authenticator>,
    search: SearchService,
}

impl App {
    pub fn new(config: Arc<AppConfig>, authenticator: Arc<Authenticator>, search: SearchService) -> Self {
        Self {
            config,
            authenticator,
            search,
        }
    }

    /// Dispatch a request; `url` is the request target (path and query)
    ///
    /// HEAD is answered like GET without a body.
    pub fn handle(&self, method: &str, url: &str) -> HttpResponse {
        let head = method.eq_ignore_ascii_case("HEAD");
        if !head && !method.eq_ignore_ascii_case("GET") {
            return HttpResponse::error(405, "Method not allowed");
        }

        let mut response = self.get(url);
        if head {
            response.body.clear();
        }
        response
    }

    fn get(&self, url: &str) -> HttpResponse {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        match path {
            "/" => self.index(),
            "/search" => self.search(&query_param(query, "query").unwrap_or_default()),
            "/oauth2callback" => self.oauth_callback(url),
            _ => HttpResponse::error(404, "Not found"),
        }
    }

    fn index(&self) -> HttpResponse {
        match assets::index_html() {
            Some(html) => HttpResponse::html(html.into_owned()),
            None => HttpResponse::error(500, "Search page is missing"),
        }
    }

    fn search(&self, query: &str) -> HttpResponse {
        match self.search.search(query) {
            Ok(SearchOutcome::Results(summaries)) => HttpResponse::json(200, &json!(summaries)),
            Ok(SearchOutcome::AuthorizationRequired(consent_url)) => {
                HttpResponse::redirect(consent_url)
            }
            Err(e) => HttpResponse::error(500, &error_message(&e)),
        }
    }

    fn oauth_callback(&self, request_target: &str) -> HttpResponse {
        let result = self
            .callback_url(request_target)
            .and_then(|url| self.authenticator.complete_authorization(&url));

        match result {
            Ok(_) => HttpResponse::redirect("/"),
            Err(e) => {
                error!("OAuth callback failed: {:#}", e);
                HttpResponse::error(500, &error_message(&e))
            }
        }
    }

    /// Rebuild the absolute URL the provider redirected to
    fn callback_url(&self, request_target: &str) -> Result<String> {
        let redirect = self
            .config
            .redirect_url()
            .context("Cannot reconstruct callback URL")?;
        Ok(format!(
            "{}{}",
            redirect.origin().ascii_serialization(),
            request_target
        ))
    }
}

/// First value of a query-string parameter
fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Provider errors are shown verbatim; anything else with its full context
fn error_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<ProviderError>() {
        Some(provider) => provider.message.clone(),
        None => format!("{:#}", e),
    }
}
