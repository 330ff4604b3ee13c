//! Access token value type.
//!
//! A [`Credential`] is the opaque token handed back by the provider app plus
//! the instant it stops being usable. It is immutable once built; equality
//! and the persisted form depend only on those two fields.
//!
//! Expiry is kept as epoch milliseconds, the unit the provider app reports.
//! A value of `0` means the token never expires.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// Expiry value meaning "never expires".
pub const NEVER_EXPIRES: i64 = 0;

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// An access token and its expiry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential {
    value: String,
    expires_on: i64,
}

/// On-disk shape of a credential.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedCredential {
    access_token_value: String,
    #[serde(default)]
    expires_on: i64,
}

impl Credential {
    /// Build a credential from a token and an expiry in epoch milliseconds.
    ///
    /// Pass [`NEVER_EXPIRES`] for tokens without an expiry.
    pub fn new(value: impl Into<String>, expires_on: i64) -> Self {
        Self {
            value: value.into(),
            expires_on,
        }
    }

    /// Build a credential expiring at `expires_at`, truncated to milliseconds.
    pub fn expiring_at(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self::new(value, expires_at.timestamp_millis())
    }

    /// Build a credential that never expires.
    pub fn never_expiring(value: impl Into<String>) -> Self {
        Self::new(value, NEVER_EXPIRES)
    }

    /// The opaque token value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Expiry in epoch milliseconds, or [`NEVER_EXPIRES`].
    pub fn expires_on(&self) -> i64 {
        self.expires_on
    }

    /// Expiry as a timestamp, `None` for a never-expiring token.
    ///
    /// Millisecond values beyond chrono's range saturate to its bounds.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.expires_on == NEVER_EXPIRES {
            return None;
        }
        DateTime::from_timestamp_millis(self.expires_on).or(Some(if self.expires_on > 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        }))
    }

    /// Whether the token never expires.
    pub fn is_never_expiring(&self) -> bool {
        self.expires_on == NEVER_EXPIRES
    }

    /// Whether the token has expired as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the token has expired as of `now`.
    ///
    /// A token is still live only while its expiry is strictly after `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_never_expiring() && self.expires_on <= now.timestamp_millis()
    }

    /// Encode into the persisted string form.
    pub fn save(&self) -> Result<String> {
        let saved = SavedCredential {
            access_token_value: self.value.clone(),
            expires_on: self.expires_on,
        };
        Ok(serde_json::to_string(&saved)?)
    }

    /// Decode a string produced by [`Credential::save`].
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::MalformedCredential`] if the string is not a
    /// saved credential.
    pub fn recover(saved: &str) -> Result<Self> {
        let saved: SavedCredential =
            serde_json::from_str(saved).map_err(|e| VaultError::MalformedCredential {
                reason: e.to_string(),
            })?;
        Ok(Self::new(saved.access_token_value, saved.expires_on))
    }
}

// The token is a bearer secret; keep it out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn save_and_recover_round_trip() {
        let cases = [
            Credential::new("AQV-token", 1_700_000_000_123),
            Credential::never_expiring("forever"),
            Credential::new("", -42),
            Credential::new("quote\"and\\slash", i64::MAX),
        ];

        for credential in cases {
            let saved = credential.save().unwrap();
            let recovered = Credential::recover(&saved).unwrap();
            assert_eq!(recovered, credential);
        }
    }

    #[test]
    fn saved_form_uses_provider_field_names() {
        let saved = Credential::new("tok", 5).save().unwrap();
        let json: serde_json::Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(json["accessTokenValue"], "tok");
        assert_eq!(json["expiresOn"], 5);
    }

    #[test]
    fn recover_without_expiry_never_expires() {
        let credential = Credential::recover(r#"{"accessTokenValue":"tok"}"#).unwrap();
        assert!(credential.is_never_expiring());
        assert!(credential.expires_at().is_none());
    }

    #[test]
    fn recover_rejects_garbage() {
        for input in ["", "not json", "{}", r#"{"expiresOn":1}"#] {
            let result = Credential::recover(input);
            assert!(
                matches!(result, Err(VaultError::MalformedCredential { .. })),
                "input {input:?} should be rejected"
            );
        }
    }

    #[test]
    fn expiry_is_strict() {
        let now = Utc::now();
        let credential = Credential::expiring_at("tok", now);
        assert!(credential.is_expired_at(now));
        assert!(!credential.is_expired_at(now - Duration::milliseconds(1)));
    }

    #[test]
    fn future_credential_is_not_expired() {
        let credential = Credential::expiring_at("tok", Utc::now() + Duration::hours(1));
        assert!(!credential.is_expired());
    }

    #[test]
    fn never_expiring_credential_is_never_expired() {
        let credential = Credential::never_expiring("tok");
        assert!(!credential.is_expired_at(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn expiring_at_truncates_to_millis() {
        let at = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let credential = Credential::expiring_at("tok", at);
        assert_eq!(credential.expires_on(), 1_700_000_000_123);
    }

    #[test]
    fn expires_at_saturates_out_of_range() {
        let credential = Credential::new("tok", i64::MAX);
        assert_eq!(credential.expires_at(), Some(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", Credential::new("super-secret", 1));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
