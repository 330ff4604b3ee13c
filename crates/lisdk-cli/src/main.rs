//! CLI entry point for lisdk.
//!
//! This binary provides the `lisdk` command for inspecting and seeding the
//! session the SDK persists, and for previewing the scope and deep-link
//! values it would hand to the provider app.

mod cli;
mod commands;
mod helpers;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::helpers::{init_tracing, load_config, open_session, resolve_db_path};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // A missing .env is fine; it only supplies LISDK_DB and RUST_LOG.
    let _ = dotenvy::dotenv();
    init_tracing("warn");

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    // Scope previews need no session.
    if let Commands::Scope { permissions } = &cli.command {
        println!("{}", commands::cmd_scope(permissions));
        return Ok(());
    }

    let session = open_session(&config, &resolve_db_path(cli.db))?;
    let output = match cli.command {
        Commands::Status => commands::cmd_status(&session),
        Commands::Import { token, expires_on } => {
            commands::cmd_import(&session, &token, expires_on)?
        }
        Commands::Clear => commands::cmd_clear(&session)?,
        Commands::DeeplinkUri { member } => {
            commands::cmd_deeplink_uri(&session, &config, member.as_deref())?
        }
        Commands::Scope { permissions } => commands::cmd_scope(&permissions),
    };

    println!("{output}");
    Ok(())
}
