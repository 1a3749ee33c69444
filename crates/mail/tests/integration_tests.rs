//! Integration tests for the mail crate
//!
//! These tests drive the full flow (token file, token endpoint, Gmail API)
//! against local mock servers.

use std::sync::Arc;

use chrono::{Duration, Utc};
use mail::{
    AppConfig, Authenticator, Credential, CredentialStatus, CredentialStore, FileCredentialStore,
    GmailClient, GmailCredentials, GoogleTokenEndpoint, ProviderError, SearchOutcome,
    SearchService,
};
use mockito::{Matcher, Server};
use tempfile::TempDir;

/// Wire an authenticator and search service to mock servers and a temp token file
fn make_service(
    server: &Server,
    token_path: &std::path::Path,
) -> (SearchService, Arc<Authenticator>) {
    let config = Arc::new(AppConfig {
        token_path: token_path.to_path_buf(),
        ..AppConfig::default()
    });
    let registration = GmailCredentials::new("client-id", "client-secret");
    let endpoint =
        GoogleTokenEndpoint::with_token_url(&registration, &format!("{}/token", server.url()));

    let authenticator = Arc::new(Authenticator::new(
        config.clone(),
        registration,
        Box::new(FileCredentialStore::new(&config.token_path)),
        Box::new(endpoint),
    ));
    let service = SearchService::new(
        &config,
        authenticator.clone(),
        Box::new(GmailClient::with_base_url(&server.url())),
    );
    (service, authenticator)
}

fn write_credential(path: &std::path::Path, credential: &Credential) {
    FileCredentialStore::new(path).save(credential).unwrap();
}

#[test]
fn test_search_with_stored_credential() {
    let mut server = Server::new();
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");

    let mut credential = Credential::new("valid-token");
    credential.expiry = Some(Utc::now() + Duration::hours(1));
    write_credential(&token_path, &credential);

    let list = server
        .mock("GET", "/users/me/messages")
        .match_header("authorization", "Bearer valid-token")
        .match_query(Matcher::UrlEncoded("q".into(), "subject:invoice".into()))
        .with_status(200)
        .with_body(r#"{"messages": [{"id": "m1", "threadId": "t1"}]}"#)
        .create();
    let get = server
        .mock("GET", "/users/me/messages/m1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"id": "m1", "payload": {"headers": [
                {"name": "Subject", "value": "Invoice #42"},
                {"name": "From", "value": "billing@example.com"},
                {"name": "Date", "value": "Tue, 15 Mar 2024 09:30:00 -0700 (PDT)"}
            ]}}"#,
        )
        .create();
    let token = server.mock("POST", "/token").expect(0).create();

    let (service, _) = make_service(&server, &token_path);
    let SearchOutcome::Results(results) = service.search("subject:invoice").unwrap() else {
        panic!("expected results");
    };

    list.assert();
    get.assert();
    token.assert();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].subject, "Invoice #42");
    assert_eq!(results[0].from, "billing@example.com");
    assert_eq!(results[0].date, "2024-03-15 09:30");
}

#[test]
fn test_expired_credential_refreshed_and_persisted() {
    let mut server = Server::new();
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");

    let mut credential = Credential::new("old-token");
    credential.refresh_token = Some("refresh-1".to_string());
    credential.expiry = Some(Utc::now() - Duration::hours(2));
    write_credential(&token_path, &credential);

    let token = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "refresh-1".into()),
            Matcher::UrlEncoded("client_id".into(), "client-id".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token": "new-token", "expires_in": 3599, "token_type": "Bearer"}"#)
        .expect(1)
        .create();

    let (_, authenticator) = make_service(&server, &token_path);
    let CredentialStatus::Ready(refreshed) = authenticator.ensure_credential().unwrap() else {
        panic!("expected a refreshed credential");
    };

    token.assert();
    assert_eq!(refreshed.access_token, "new-token");

    let persisted = FileCredentialStore::new(&token_path).load().unwrap().unwrap();
    assert_eq!(persisted.access_token, "new-token");
    assert_eq!(persisted.refresh_token.as_deref(), Some("refresh-1"));
}

#[test]
fn test_revoked_refresh_token_requires_consent() {
    let mut server = Server::new();
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");

    let mut credential = Credential::new("old-token");
    credential.refresh_token = Some("revoked".to_string());
    credential.expiry = Some(Utc::now() - Duration::hours(2));
    write_credential(&token_path, &credential);

    server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#)
        .create();

    let (service, _) = make_service(&server, &token_path);
    let outcome = service.search("anything").unwrap();
    assert!(matches!(outcome, SearchOutcome::AuthorizationRequired(_)));
}

#[test]
fn test_callback_exchanges_code_and_writes_token_file() {
    let mut server = Server::new();
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");

    let token = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("code".into(), "auth-code".into()),
            Matcher::UrlEncoded(
                "redirect_uri".into(),
                "http://localhost:5000/oauth2callback".into(),
            ),
        ]))
        .with_status(200)
        .with_body(
            r#"{"access_token": "first-token", "refresh_token": "first-refresh",
                "expires_in": 3599, "scope": "https://www.googleapis.com/auth/gmail.readonly",
                "token_type": "Bearer"}"#,
        )
        .create();

    let (_, authenticator) = make_service(&server, &token_path);
    authenticator
        .complete_authorization("http://localhost:5000/oauth2callback?code=auth-code&scope=x")
        .unwrap();

    token.assert();
    let persisted = FileCredentialStore::new(&token_path).load().unwrap().unwrap();
    assert_eq!(persisted.access_token, "first-token");
    assert_eq!(persisted.refresh_token.as_deref(), Some("first-refresh"));
    assert!(persisted.is_valid());
}

#[test]
fn test_provider_error_fails_search_without_partial_results() {
    let mut server = Server::new();
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");
    write_credential(&token_path, &Credential::new("valid-token"));

    server
        .mock("GET", "/users/me/messages")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"messages": [{"id": "m1"}, {"id": "m2"}]}"#)
        .create();
    server
        .mock("GET", "/users/me/messages/m1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"id": "m1", "payload": {"headers": []}}"#)
        .create();
    server
        .mock("GET", "/users/me/messages/m2")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(r#"{"error": {"code": 429, "message": "Quota exceeded for quota metric"}}"#)
        .create();

    let (service, _) = make_service(&server, &token_path);
    let err = service.search("").unwrap_err();
    let provider = err.downcast_ref::<ProviderError>().unwrap();
    assert_eq!(provider.status, Some(429));
    assert_eq!(provider.message, "Quota exceeded for quota metric");
}
