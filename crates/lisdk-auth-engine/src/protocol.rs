//! Wire names used by the provider app.
//!
//! Coordinators speak in terms of [`OutboundRequest`] and short reply keys
//! (`token`, `errorInfo`, ...). A [`ProviderChannel`] bridging to the real
//! platform uses the constants here to address the provider app, and
//! [`normalize_extras`] to turn the extras it gets back into the short keys.
//!
//! [`OutboundRequest`]: crate::channel::OutboundRequest
//! [`ProviderChannel`]: crate::channel::ProviderChannel

use crate::channel::ReplyPayload;

// -- Provider app ------------------------------------------------------------

/// Package of the provider app.
pub const PROVIDER_PACKAGE: &str = "com.linkedin.android";

/// Activity in the provider app that handles authorization.
pub const AUTHORIZE_COMPONENT: &str =
    "com.linkedin.android.liauthlib.thirdparty.LiThirdPartyAuthorizeActivity";

/// Minimum provider app version code able to serve SDK requests.
pub const MIN_APP_VERSION_CODE: u64 = 20_000;

// -- Authorization request ---------------------------------------------------

pub const AUTHORIZE_ACTION: &str = "com.linkedin.android.auth.AUTHORIZE_APP";
pub const AUTHORIZE_CATEGORY: &str = "com.linkedin.android.auth.thirdparty.authorize";
pub const SCOPE_EXTRA: &str = "com.linkedin.thirdpartysdk.SCOPE_DATA";
pub const AUTH_REQUEST_CODE: i32 = 3672;

// -- Authorization reply -----------------------------------------------------

pub const TOKEN_KEY: &str = "token";
pub const EXPIRES_ON_KEY: &str = "expiresOn";
pub const ERROR_INFO_KEY: &str = "errorInfo";
pub const ERROR_DESCRIPTION_KEY: &str = "errorDescription";
pub const AUTH_ERROR_INFO_EXTRA: &str =
    "com.linkedin.thirdparty.authorize.RESULT_ACTION_ERROR_INFO";
pub const AUTH_ERROR_DESCRIPTION_EXTRA: &str =
    "com.linkedin.thirdparty.authorize.RESULT_ACTION_ERROR_DESCRIPTION";

// -- Deep link ---------------------------------------------------------------

pub const VIEW_ACTION: &str = "android.intent.action.VIEW";
pub const DEEPLINK_SCHEME: &str = "linkedin";
pub const CURRENT_MEMBER_AUTHORITY: &str = "you";
pub const PROFILE_AUTHORITY: &str = "profile";
pub const ACCESS_TOKEN_PARAM: &str = "accessToken";
pub const SOURCE_PARAM: &str = "src";
pub const SDK_SOURCE_TAG: &str = "sdk";
pub const DEEPLINK_REQUEST_CODE: i32 = 13287;

pub const ERROR_CODE_KEY: &str = "errorCode";
pub const ERROR_MESSAGE_KEY: &str = "errorMessage";
pub const DEEPLINK_ERROR_CODE_EXTRA: &str = "com.linkedin.thirdparty.deeplink.EXTRA_ERROR_CODE";
pub const DEEPLINK_ERROR_MESSAGE_EXTRA: &str =
    "com.linkedin.thirdparty.deeplink.EXTRA_ERROR_MESSAGE";

// -- Result codes ------------------------------------------------------------

pub const RESULT_OK: i32 = -1;
pub const RESULT_CANCELED: i32 = 0;

/// Rename platform extra names to the short reply keys.
///
/// Keys that are not platform extras pass through unchanged. When both the
/// long and the short form are present, the long form wins.
pub fn normalize_extras(extras: ReplyPayload) -> ReplyPayload {
    let mut normalized = ReplyPayload::new();
    let mut renamed = Vec::new();

    for (key, value) in extras {
        match short_key(&key) {
            Some(short) => renamed.push((short, value)),
            None => {
                normalized.insert(key, value);
            }
        }
    }

    for (short, value) in renamed {
        normalized.insert(short.to_string(), value);
    }
    normalized
}

fn short_key(extra: &str) -> Option<&'static str> {
    match extra {
        AUTH_ERROR_INFO_EXTRA => Some(ERROR_INFO_KEY),
        AUTH_ERROR_DESCRIPTION_EXTRA => Some(ERROR_DESCRIPTION_KEY),
        DEEPLINK_ERROR_CODE_EXTRA => Some(ERROR_CODE_KEY),
        DEEPLINK_ERROR_MESSAGE_EXTRA => Some(ERROR_MESSAGE_KEY),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: serde_json::Value) -> ReplyPayload {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn normalize_renames_platform_extras() {
        let extras = payload(json!({
            AUTH_ERROR_INFO_EXTRA: "SERVER_ERROR",
            AUTH_ERROR_DESCRIPTION_EXTRA: "try later",
            DEEPLINK_ERROR_CODE_EXTRA: "INVALID_REQUEST",
            DEEPLINK_ERROR_MESSAGE_EXTRA: "bad member",
            "token": "T",
        }));

        let normalized = normalize_extras(extras);
        assert_eq!(normalized[ERROR_INFO_KEY], "SERVER_ERROR");
        assert_eq!(normalized[ERROR_DESCRIPTION_KEY], "try later");
        assert_eq!(normalized[ERROR_CODE_KEY], "INVALID_REQUEST");
        assert_eq!(normalized[ERROR_MESSAGE_KEY], "bad member");
        assert_eq!(normalized[TOKEN_KEY], "T");
        assert!(!normalized.contains_key(AUTH_ERROR_INFO_EXTRA));
    }

    #[test]
    fn normalize_prefers_platform_extra() {
        let extras = payload(json!({
            ERROR_CODE_KEY: "SERVER_ERROR",
            DEEPLINK_ERROR_CODE_EXTRA: "INVALID_REQUEST",
        }));

        let normalized = normalize_extras(extras);
        assert_eq!(normalized[ERROR_CODE_KEY], "INVALID_REQUEST");
        assert_eq!(normalized.len(), 1);
    }
}
