//! Subcommand implementations.
//!
//! Each command returns the text to print so the dispatch in `main.rs` owns
//! all terminal output.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use lisdk_auth_engine::{ProfileTarget, Scope, SdkConfig, profile_uri};
use lisdk_vault::{Credential, Session};
use tracing::info;

use crate::helpers::{describe_expiry, mask_token};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub fn cmd_status(session: &Session) -> String {
    let Some(credential) = session.credential() else {
        return "session: none".to_string();
    };

    let state = if session.is_valid() { "valid" } else { "expired" };
    format!(
        "session: {state}\ntoken:   {}\nexpires: {}",
        mask_token(credential.value()),
        describe_expiry(&credential),
    )
}

pub fn cmd_import(session: &Session, token: &str, expires_on: i64) -> Result<String> {
    if token.trim().is_empty() {
        bail!("token must not be empty");
    }

    let credential = Credential::new(token, expires_on);
    if credential.is_expired_at(Utc::now()) {
        bail!(
            "credential already expired at {}",
            describe_expiry(&credential)
        );
    }

    session
        .init(credential.clone())
        .context("failed to store credential")?;
    info!(expires_on, "credential imported");

    Ok(format!(
        "imported {} (expires {})",
        mask_token(credential.value()),
        describe_expiry(&credential)
    ))
}

pub fn cmd_clear(session: &Session) -> Result<String> {
    let had_credential = session.credential().is_some();
    session.clear().context("failed to clear session")?;
    info!(had_credential, "session cleared");

    Ok(if had_credential {
        "session cleared".to_string()
    } else {
        "no session to clear".to_string()
    })
}

// ---------------------------------------------------------------------------
// Request previews
// ---------------------------------------------------------------------------

pub fn cmd_scope(permissions: &[String]) -> String {
    Scope::build(permissions.iter().map(String::as_str)).to_wire()
}

pub fn cmd_deeplink_uri(
    session: &Session,
    config: &SdkConfig,
    member: Option<&str>,
) -> Result<String> {
    let Some(credential) = session.credential().filter(|c| !c.is_expired()) else {
        bail!("no valid session; import a credential first");
    };

    let target = member.map_or(ProfileTarget::CurrentMember, ProfileTarget::from_member_id);
    let uri = profile_uri(&target, credential.value(), &config.sdk_source_tag)?;
    Ok(uri.to_string())
}
