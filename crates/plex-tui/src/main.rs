mod app;
mod browse;
mod core;
mod edit;
mod executor;
mod message;
mod theme;
mod ui;
mod widgets;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use plex_proto::auth::{ClientIdentity, CredentialStore, PinAuthenticator};
use plex_proto::client::PlexClient;
use plex_proto::config::{JsonSettingsStore, SettingsStore};
use plex_proto::favorites::SqliteFavorites;
use plex_proto::platform::{self, AUTH_FILE, FAVORITES_DB_FILE, FAVORITES_JSON_FILE, LOG_FILE};
use plex_proto::player::PlayerClient;

/// Terminal remote for a headless Plexamp player.
#[derive(Parser, Debug)]
#[command(name = "plexamp-tui", version, about)]
struct Args {
    /// Path to config.json (favorites, credentials and the log live beside it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Authorize this device with plex.tv, then exit
    #[arg(long)]
    auth: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(platform::default_config_path);
    let config_dir = config_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating {}", config_dir.display()))?;

    let log_path = platform::sibling_of(&config_path, LOG_FILE);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log {}", log_path.display()))?;

    // RUST_LOG wins; otherwise app code at info (debug with --debug) and the
    // HTTP stack kept quiet.
    let level = if args.debug { "debug" } else { "info" };
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| format!("{level},hyper_util=warn,reqwest=warn,hyper=warn"));
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    info!("plexamp-tui starting, config {}", config_path.display());

    let identity = ClientIdentity::for_this_host();
    let credentials = CredentialStore::new(platform::sibling_of(&config_path, AUTH_FILE));

    if args.auth {
        return authorize(identity, &credentials).await;
    }

    eprintln!("plexamp-tui log: {}", log_path.display());

    // ── Load state ───────────────────────────────────────────────────────────
    let settings_store = JsonSettingsStore::new(&config_path);
    let loaded = settings_store
        .load()
        .with_context(|| format!("loading {}", config_path.display()))?;
    if loaded.using_default {
        info!("no config found, wrote defaults to {}", config_path.display());
    }

    let mut favorites = SqliteFavorites::open(&platform::sibling_of(&config_path, FAVORITES_DB_FILE))
        .context("opening favorites database")?;
    let legacy = platform::sibling_of(&config_path, FAVORITES_JSON_FILE);
    if let Err(e) = favorites.import_json(&legacy) {
        warn!("importing {} failed: {e}", legacy.display());
    }

    let token = match credentials.token() {
        Some(token) => verified(identity.clone(), token).await,
        None => {
            warn!("no usable Plex credential, library browsing disabled (run with --auth)");
            None
        }
    };
    let authenticated = token.is_some();

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let services = executor::Services::new(PlexClient::new(identity, token)?, PlayerClient::new()?);
    let session = core::Session::new(
        loaded,
        Box::new(settings_store),
        Box::new(favorites),
        authenticated,
    );
    app::App::new(session, services).run().await
}

/// Confirms a stored token with plex.tv. A rejected token is dropped; when
/// plex.tv cannot be reached the stored token is kept.
async fn verified(identity: ClientIdentity, token: String) -> Option<String> {
    let authenticator = match PinAuthenticator::new(identity) {
        Ok(a) => a,
        Err(e) => {
            warn!("cannot build plex.tv client: {e}");
            return Some(token);
        }
    };
    match authenticator.verify_token(&token).await {
        Ok(true) => Some(token),
        Ok(false) => {
            warn!("Plex credential rejected by plex.tv, run with --auth");
            None
        }
        Err(e) => {
            warn!("could not verify Plex credential, keeping it: {e}");
            Some(token)
        }
    }
}

/// `--auth`: PIN flow on stdout, credential saved beside the config.
async fn authorize(identity: ClientIdentity, credentials: &CredentialStore) -> anyhow::Result<()> {
    let authenticator = PinAuthenticator::new(identity)?;
    let creds = authenticator
        .authenticate(|url, pin| {
            println!("To authorize plexamp-tui, open this URL in a browser:\n\n  {url}\n");
            println!("PIN code: {}", pin.code);
            println!("Waiting for approval...");
        })
        .await
        .context("Plex authorization failed")?;
    credentials
        .save(&creds)
        .with_context(|| format!("saving {}", credentials.path().display()))?;
    match &creds.username {
        Some(user) => println!("Authorized as {user}."),
        None => println!("Authorized."),
    }
    info!("credential saved to {}", credentials.path().display());
    Ok(())
}
