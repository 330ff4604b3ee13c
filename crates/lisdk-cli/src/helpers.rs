//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization, configuration and session loading, and
//! display formatting for credentials.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use lisdk_auth_engine::SdkConfig;
use lisdk_vault::{Credential, CredentialStore, Session, SqliteStore};
use tracing_subscriber::EnvFilter;

/// Database used when neither `--db` nor `LISDK_DB` is given.
const DEFAULT_DB_PATH: &str = "data/lisdk.db";

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
///
/// `RUST_LOG` overrides the default when set.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Configuration and storage
// ---------------------------------------------------------------------------

/// Load the SDK configuration, or defaults when no file was given.
pub fn load_config(path: Option<&Path>) -> Result<SdkConfig> {
    match path {
        Some(path) => SdkConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(SdkConfig::default()),
    }
}

/// Pick the session database: flag, then `LISDK_DB`, then the default.
pub fn resolve_db_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("LISDK_DB").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}

/// Open the persisted session described by `config` at `db_path`.
pub fn open_session(config: &SdkConfig, db_path: &Path) -> Result<Session> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let store = SqliteStore::open(db_path, &config.storage_namespace)
        .with_context(|| format!("failed to open session database {}", db_path.display()))?;
    tracing::debug!(path = %db_path.display(), "session database opened");

    Ok(Session::from_credential_store(CredentialStore::with_key(
        store,
        &config.storage_key,
    )))
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Show the first and last four characters of a token.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Human-readable expiry of a credential.
pub fn describe_expiry(credential: &Credential) -> String {
    match credential.expires_at() {
        None => "never".to_string(),
        Some(at) => at.to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}
