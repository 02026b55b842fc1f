use sila::adapters::ReqwestHttpClient;
use sila::auth::{AuthController, Credentials, CredentialsManager};
use sila::config::AppConfig;
use sila::emotes::{EmoteClient, EmoteListView, GlobalEmoteSet};
use sila::error::ApiError;
use sila::host::{MountAction, ProviderHost};
use sila::provider::DataProvider;

use color_eyre::Result;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

fn init_tracing(config: &AppConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load stored credentials. A broken file is logged and treated as signed out.
fn load_credentials(config: &AppConfig) -> Credentials {
    let manager = match &config.credentials_path {
        Some(path) => Some(CredentialsManager::with_path(path)),
        None => CredentialsManager::new(),
    };
    let Some(manager) = manager else {
        tracing::warn!("No home directory, continuing signed out");
        return Credentials::default();
    };

    match manager.load() {
        Ok(credentials) => credentials,
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring unreadable credentials");
            Credentials::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = AppConfig::from_env();
    init_tracing(&config);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), api = %config.emote_api_url, "Starting");

    let credentials = load_credentials(&config);
    let auth = AuthController::from_credentials(&credentials);
    if credentials.has_token() && !auth.is_authorized() {
        tracing::info!("Stored token has expired, continuing signed out");
    }

    let http = ReqwestHttpClient::with_timeout(REQUEST_TIMEOUT)?;
    let client = EmoteClient::with_base_url(http, config.emote_api_url.clone());
    let requires_auth = config.requires_auth;
    let provider_auth = auth.clone();

    let mut host: ProviderHost<GlobalEmoteSet, ApiError> = ProviderHost::owned(move || {
        DataProvider::new(client.clone(), provider_auth.clone(), requires_auth)
            .with_name("global-emotes")
    })
    .with_options(config.host_options());

    let view = EmoteListView::default();

    if let MountAction::Reloaded { .. } = host.appear() {
        print!("{}", host.render(&view));
        loop {
            host.pump();
            if !host.is_fetching() {
                break;
            }
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, cancelling fetch");
                    break;
                }
                _ = host.changed() => {}
            }
        }
    }

    print!("{}", host.render(&view));
    host.disappear();
    Ok(())
}
