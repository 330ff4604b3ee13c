//! Error types for the auth engine crate.
//!
//! Two kinds of failure live here. [`AuthEngineError`] covers the SDK's own
//! plumbing (configuration, storage, URI construction) and is returned as a
//! `Result`. [`DispatchError`] is what a [`ProviderChannel`] reports when it
//! cannot hand a request to the provider app at all.
//!
//! Failures of a delegated action itself are never returned this way; they
//! reach the host through the request's completion as a
//! [`TypedError`](crate::error_code::TypedError).
//!
//! [`ProviderChannel`]: crate::channel::ProviderChannel

/// Unified error type for the lisdk auth engine.
#[derive(Debug, thiserror::Error)]
pub enum AuthEngineError {
    /// An error propagated from the vault crate.
    #[error("vault error: {0}")]
    VaultError(#[from] lisdk_vault::VaultError),

    /// Configuration is missing or malformed.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// The configuration file is not valid TOML for [`SdkConfig`](crate::config::SdkConfig).
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error (e.g. reading the configuration file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing error.
    #[error("url parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, AuthEngineError>;

/// Why a request could not be handed to the provider app.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Nothing on the device can receive the request (app missing or
    /// uninstalled since the version check).
    #[error("no handler resolvable for {target}")]
    TargetNotResolvable {
        /// Package or URI the channel tried to reach.
        target: String,
    },

    /// The transport failed for another reason.
    #[error("transport failure: {reason}")]
    Transport {
        /// Transport-specific explanation.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
