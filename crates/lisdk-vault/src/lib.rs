//! Credential persistence for lisdk.
//!
//! This crate owns the credential lifecycle of the SDK: the access token
//! value type, the durable storage it is written to, and the [`Session`]
//! the rest of the SDK consults before delegating work to the provider app.
//!
//! # Modules
//!
//! - [`credential`]: immutable access token + expiry, and its saved form.
//! - [`store`]: durable key-value text storage (SQLite, in-memory).
//! - [`session`]: write-through credential cache and validity checks.
//! - [`error`]: unified error types.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lisdk_vault::{Credential, Session, SqliteStore};
//! use lisdk_vault::session::DEFAULT_NAMESPACE;
//!
//! # fn example() -> lisdk_vault::error::Result<()> {
//! let store = SqliteStore::open("data/session.db", DEFAULT_NAMESPACE)?;
//! let session = Session::new(store);
//!
//! if !session.is_valid() {
//!     // A token obtained some other way can seed the session directly.
//!     session.init(Credential::new("AQV...", 1_900_000_000_000))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod credential;
pub mod error;
pub mod session;
pub mod store;

// Re-export the most commonly used types at the crate root for convenience.
pub use credential::{Credential, NEVER_EXPIRES};
pub use error::{Result, VaultError};
pub use session::{CredentialStore, Session};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
