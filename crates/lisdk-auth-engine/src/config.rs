//! SDK configuration.
//!
//! Every field has a default matching the production provider app, so an
//! empty TOML document (or no file at all) yields a working configuration.
//!
//! ```toml
//! provider_package = "com.linkedin.android"
//! min_app_version_code = 20000
//! storage_namespace = "li_shared_pref_store"
//! show_store_dialog = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuthEngineError, Result};
use crate::protocol;

/// Settings consumed by [`SdkBuilder`](crate::sdk::SdkBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Package of the provider app.
    pub provider_package: String,
    /// Component in the provider app that handles authorization.
    pub authorize_component: String,
    /// Lowest provider app version code the SDK will talk to.
    pub min_app_version_code: u64,
    /// Storage namespace holding the credential record.
    pub storage_namespace: String,
    /// Key of the credential record inside the namespace.
    pub storage_key: String,
    /// Whether the store redirect asks for confirmation. Applies to deep
    /// links and to `AuthorizationCoordinator::authorize`.
    pub show_store_dialog: bool,
    /// Value of the `src` parameter on deep links.
    pub sdk_source_tag: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            provider_package: protocol::PROVIDER_PACKAGE.to_string(),
            authorize_component: protocol::AUTHORIZE_COMPONENT.to_string(),
            min_app_version_code: protocol::MIN_APP_VERSION_CODE,
            storage_namespace: lisdk_vault::session::DEFAULT_NAMESPACE.to_string(),
            storage_key: lisdk_vault::session::ACCESS_TOKEN_KEY.to_string(),
            show_store_dialog: true,
            sdk_source_tag: protocol::SDK_SOURCE_TAG.to_string(),
        }
    }
}

impl SdkConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded sdk configuration");
        Ok(config)
    }

    /// Reject configurations no provider app could serve.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("provider_package", &self.provider_package),
            ("authorize_component", &self.authorize_component),
            ("storage_namespace", &self.storage_namespace),
            ("storage_key", &self.storage_key),
            ("sdk_source_tag", &self.sdk_source_tag),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AuthEngineError::InvalidConfig {
                    reason: format!("{field} must not be empty"),
                });
            }
        }
        Ok(())
    }
}
