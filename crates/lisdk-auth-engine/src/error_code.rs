//! Typed error domain shared by both coordinators.
//!
//! The provider app reports failures as opaque identifier strings. They are
//! classified into the closed [`ErrorKind`] set by [`ErrorKind::resolve`],
//! which is total: anything unrecognised becomes
//! [`ErrorKind::UnknownError`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Classified failure of a delegated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    None,
    InvalidRequest,
    NetworkUnavailable,
    UserCancelled,
    UnknownError,
    ServerError,
    /// The provider app is missing or could not be reached.
    #[serde(rename = "LINKEDIN_APP_NOT_FOUND")]
    ProviderAppNotFound,
    /// No valid credential was available for a delegated action.
    NotAuthenticated,
    /// A newer request replaced this one before the provider app replied.
    Superseded,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 9] = [
        Self::None,
        Self::InvalidRequest,
        Self::NetworkUnavailable,
        Self::UserCancelled,
        Self::UnknownError,
        Self::ServerError,
        Self::ProviderAppNotFound,
        Self::NotAuthenticated,
        Self::Superseded,
    ];

    /// The symbolic name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::NetworkUnavailable => "NETWORK_UNAVAILABLE",
            Self::UserCancelled => "USER_CANCELLED",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::ServerError => "SERVER_ERROR",
            Self::ProviderAppNotFound => "LINKEDIN_APP_NOT_FOUND",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::Superseded => "SUPERSEDED",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::InvalidRequest => "Invalid request",
            Self::NetworkUnavailable => "Unavailable network connection",
            Self::UserCancelled => "User canceled action",
            Self::UnknownError => "Unknown or not defined error",
            Self::ServerError => "Server side error",
            Self::ProviderAppNotFound => "LinkedIn application not found",
            Self::NotAuthenticated => "User is not authenticated in LinkedIn app",
            Self::Superseded => "Request replaced by a newer request",
        }
    }

    /// Classify a provider-supplied identifier.
    ///
    /// Matching is exact and case-sensitive against [`ErrorKind::as_str`].
    /// Anything else, including the empty string, is `UnknownError`.
    pub fn resolve(identifier: &str) -> Self {
        match identifier {
            "NONE" => Self::None,
            "INVALID_REQUEST" => Self::InvalidRequest,
            "NETWORK_UNAVAILABLE" => Self::NetworkUnavailable,
            "USER_CANCELLED" => Self::UserCancelled,
            "UNKNOWN_ERROR" => Self::UnknownError,
            "SERVER_ERROR" => Self::ServerError,
            "LINKEDIN_APP_NOT_FOUND" => Self::ProviderAppNotFound,
            "NOT_AUTHENTICATED" => Self::NotAuthenticated,
            "SUPERSEDED" => Self::Superseded,
            _ => Self::UnknownError,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TypedError
// ---------------------------------------------------------------------------

/// A classified failure delivered to a request's error callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TypedError {
    #[serde(rename = "errorCode")]
    kind: ErrorKind,
    #[serde(rename = "errorMessage")]
    message: String,
}

impl TypedError {
    /// Build an error of a known kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build an error from a provider-supplied identifier.
    pub fn from_identifier(identifier: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::resolve(identifier), message)
    }

    pub(crate) fn superseded() -> Self {
        Self::new(ErrorKind::Superseded, "a newer request replaced this one")
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Pretty-printed JSON: `{"errorCode": ..., "errorMessage": ...}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
