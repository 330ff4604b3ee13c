//! Request/response channel to the provider app.
//!
//! The SDK never talks to the provider app directly. Coordinators build an
//! [`OutboundRequest`] carrying a fresh [`RequestId`] and hand it to a
//! [`ProviderChannel`]; the host later forwards the provider app's reply,
//! tagged with the same id, into the coordinator's `handle_reply`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::error::DispatchError;
use crate::protocol;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Correlation id tying a request to its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Mint a new, time-ordered id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The application a request is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetApp {
    /// Package of the provider app.
    pub package: String,
    /// Specific component inside the package, if the request names one.
    pub component: Option<String>,
}

/// What the provider app is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestAction {
    /// Log in and consent, returning an access token.
    Authorize,
    /// Show a provider-hosted page.
    View,
}

impl RequestAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorize => "authorize",
            Self::View => "view",
        }
    }

    /// Platform action name.
    pub fn wire_action(&self) -> &'static str {
        match self {
            Self::Authorize => protocol::AUTHORIZE_ACTION,
            Self::View => protocol::VIEW_ACTION,
        }
    }

    /// Platform request code used by activity-result style transports.
    pub fn request_code(&self) -> i32 {
        match self {
            Self::Authorize => protocol::AUTH_REQUEST_CODE,
            Self::View => protocol::DEEPLINK_REQUEST_CODE,
        }
    }
}

/// Action-specific request data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Space-joined permission identifiers.
    Authorization { scope: String },
    /// Deep-link URI; carries the access token in its query.
    DeepLink { uri: Url },
}

/// A request ready to be handed to the provider app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub id: RequestId,
    pub target: TargetApp,
    pub action: RequestAction,
    /// Platform categories the request must carry.
    pub categories: Vec<String>,
    pub body: RequestBody,
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// How the provider app finished a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOutcome {
    Ok,
    Cancelled,
    Other,
}

impl ReplyOutcome {
    /// Map a platform activity result code.
    pub fn from_result_code(code: i32) -> Self {
        match code {
            protocol::RESULT_OK => Self::Ok,
            protocol::RESULT_CANCELED => Self::Cancelled,
            _ => Self::Other,
        }
    }
}

/// Reply data, keyed by the short names in [`protocol`].
pub type ReplyPayload = serde_json::Map<String, Value>;

/// A string field, or `""` when absent or not a string.
pub(crate) fn payload_str(payload: &ReplyPayload, key: &str) -> String {
    payload
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// An integer field given either as a JSON number or a numeric string.
pub(crate) fn payload_i64(payload: &ReplyPayload, key: &str) -> Option<i64> {
    match payload.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Transport that delivers requests to the provider app.
///
/// `send` only hands the request over; the reply arrives later through the
/// host. Implementations may deliver that reply on any thread, including
/// synchronously from inside `send`.
pub trait ProviderChannel: Send + Sync {
    /// Hand `request` to the provider app.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::TargetNotResolvable`] when nothing can
    /// receive the request, [`DispatchError::Transport`] for other faults.
    fn send(&self, request: &OutboundRequest) -> std::result::Result<(), DispatchError>;
}

/// Outcome of starting a delegated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The request was handed over; the reply will carry this id.
    Sent(RequestId),
    /// The provider app is missing or outdated; the user was sent to the
    /// store. No callback fires.
    Redirected,
    /// The channel could not deliver the request. No callback fires.
    NotDelivered,
    /// The request was refused up front and the error callback has already
    /// fired.
    Rejected,
}

impl Dispatch {
    /// The request id, if a request was sent.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::Sent(id) => Some(*id),
            _ => None,
        }
    }
}

/// What `handle_reply` did with a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDisposition {
    /// The pending callback received its terminal outcome.
    Resolved,
    /// No callback was pending for this id; nothing happened.
    Ignored,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
