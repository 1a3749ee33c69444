//! Beacon - search a Gmail mailbox from the browser
//!
//! Serves a search page, runs Gmail queries on behalf of the signed-in user,
//! and handles the OAuth2 consent callback.

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::sync::Arc;

use mail::{
    AppConfig, Authenticator, FileCredentialStore, GmailClient, GmailCredentials,
    GoogleTokenEndpoint, SearchService,
};

mod assets;
mod routes;
mod server;
#[cfg(test)]
mod testing;

use routes::App;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Bootstrap config directory
    if let Err(e) = config::init() {
        warn!("Failed to initialize config directory: {}", e);
    }

    let settings = Arc::new(AppConfig::load().context("Failed to load settings")?);
    if settings.allow_insecure_transport {
        warn!("Insecure OAuth transport is enabled; do not run this way in production");
    }

    let registration = GmailCredentials::load(&settings.client_secrets_path).with_context(|| {
        format!(
            "Place your Google OAuth client file at {} or set GMAIL_CLIENT_ID and GMAIL_CLIENT_SECRET",
            settings.client_secrets_path.display()
        )
    })?;

    let authenticator = Arc::new(Authenticator::new(
        settings.clone(),
        registration.clone(),
        Box::new(FileCredentialStore::new(&settings.token_path)),
        Box::new(GoogleTokenEndpoint::new(&registration)),
    ));
    let search = SearchService::new(&settings, authenticator.clone(), Box::new(GmailClient::new()));
    let app = App::new(settings.clone(), authenticator, search);

    let server = server::bind(&settings.bind_address)?;

    if settings.open_browser {
        let home = settings.redirect_url()?.origin().ascii_serialization();
        if let Err(e) = open::that(&home) {
            warn!("Failed to open browser: {}. Visit {} manually.", e, home);
        }
    }

    info!("Beacon started");
    server::serve(&app, &server);
    Ok(())
}
