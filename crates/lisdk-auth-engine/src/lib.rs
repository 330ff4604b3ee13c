//! Delegated authorization and deep-link engine for lisdk.
//!
//! A host app never handles the member's password. It asks the provider app
//! to log the member in and consent to a [`Scope`], receives an access token
//! in the reply, and stores it in the [`lisdk_vault::Session`]. With a valid
//! session it can then ask the provider app to open profile pages.
//!
//! # Architecture
//!
//! ```text
//! Sdk
//! ├── Session                    (lisdk-vault: credential + storage)
//! ├── AuthorizationCoordinator   (authorize request / reply)
//! ├── DeepLinkCoordinator        (view request / reply)
//! └── ProviderApp                (install + version check, store redirect)
//!
//! coordinator ──OutboundRequest──▶ ProviderChannel ──▶ provider app
//! coordinator ◀──handle_reply(id, outcome, payload)──── host
//! ```
//!
//! Each coordinator holds at most one pending request. Outcomes reach the
//! host through the request's [`Completion`] as success or a [`TypedError`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lisdk_auth_engine::{
//!     AppInspector, Completion, OutboundRequest, ProviderChannel, Scope, Sdk, StoreRedirect,
//! };
//! use lisdk_auth_engine::error::DispatchError;
//! use lisdk_auth_engine::scope::permission;
//!
//! struct Bridge;
//! impl ProviderChannel for Bridge {
//!     fn send(&self, _request: &OutboundRequest) -> Result<(), DispatchError> {
//!         Ok(())
//!     }
//! }
//! impl AppInspector for Bridge {
//!     fn installed_version_code(&self, _package: &str) -> Option<u64> {
//!         Some(u64::MAX)
//!     }
//! }
//! impl StoreRedirect for Bridge {
//!     fn redirect(&self, _package: &str, _show_dialog: bool) {}
//! }
//!
//! # fn example() -> lisdk_auth_engine::error::Result<()> {
//! let bridge = Arc::new(Bridge);
//! let sdk = Sdk::builder()
//!     .channel(bridge.clone())
//!     .inspector(bridge.clone())
//!     .redirect(bridge)
//!     .build()?;
//!
//! let scope = Scope::build([permission::R_BASICPROFILE, permission::R_EMAILADDRESS]);
//! let completion = Completion::new(
//!     || println!("signed in"),
//!     |err| eprintln!("sign-in failed: {err}"),
//! );
//! sdk.authorization().begin_authorization(&scope, true, completion);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod authorization;
pub mod channel;
pub mod completion;
pub mod config;
pub mod deep_link;
pub mod error;
pub mod error_code;
pub mod protocol;
pub mod scope;
pub mod sdk;

// Re-export key types at the crate root for convenience.
pub use app::{AppInspector, ProviderApp, StoreRedirect};
pub use authorization::AuthorizationCoordinator;
pub use channel::{
    Dispatch, OutboundRequest, ProviderChannel, ReplyDisposition, ReplyOutcome, ReplyPayload,
    RequestAction, RequestBody, RequestId, TargetApp,
};
pub use completion::Completion;
pub use config::SdkConfig;
pub use deep_link::{DeepLinkCoordinator, ProfileTarget, profile_uri};
pub use error::{AuthEngineError, DispatchError, Result};
pub use error_code::{ErrorKind, TypedError};
pub use scope::Scope;
pub use sdk::{Sdk, SdkBuilder, StorageBackend};
