//! CLI argument definitions for lisdk.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// lisdk -- inspect and seed the SDK's persisted session.
#[derive(Parser)]
#[command(
    name = "lisdk",
    version,
    about = "lisdk -- inspect and seed the persisted SDK session",
    long_about = "Reads and writes the credential record the SDK keeps in its SQLite store, \
                  and previews the requests it would send to the provider app."
)]
pub struct Cli {
    /// SDK configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Session database. Falls back to `LISDK_DB`, then `data/lisdk.db`.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show whether the stored session is valid.
    Status,

    /// Store a credential obtained elsewhere.
    Import {
        /// Access token value.
        #[arg(long)]
        token: String,

        /// Expiry in epoch milliseconds; 0 never expires.
        #[arg(long, default_value_t = 0)]
        expires_on: i64,
    },

    /// Remove the stored credential.
    Clear,

    /// Print the wire form of a permission scope.
    Scope {
        /// Permission identifiers, e.g. `r_basicprofile w_share`.
        permissions: Vec<String>,
    },

    /// Print the profile deep link the stored credential would open.
    DeeplinkUri {
        /// Member id; omit (or pass `you`) for the signed-in member.
        #[arg(long)]
        member: Option<String>,
    },
}
