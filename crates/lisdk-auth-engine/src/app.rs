//! Provider app presence and currency.
//!
//! Both coordinators refuse to send anything unless the provider app is
//! installed at or above the minimum supported version. When it is not,
//! the user is handed to the app store through a [`StoreRedirect`] and the
//! request is dropped; the host retries once the app is installed.

use std::sync::Arc;

/// Reports installed package versions.
pub trait AppInspector: Send + Sync {
    /// Version code of `package`, or `None` if it is not installed.
    fn installed_version_code(&self, package: &str) -> Option<u64>;
}

/// Sends the user to install or update a package.
///
/// Which store to open, and whether to confirm first, is up to the
/// implementation.
pub trait StoreRedirect: Send + Sync {
    /// Open the store page for `package`. `show_dialog` asks for a
    /// confirmation prompt before leaving the host app.
    fn redirect(&self, package: &str, show_dialog: bool);
}

/// The provider app as seen from the host.
#[derive(Clone)]
pub struct ProviderApp {
    package: String,
    min_version_code: u64,
    inspector: Arc<dyn AppInspector>,
    redirect: Arc<dyn StoreRedirect>,
}

impl ProviderApp {
    pub fn new(
        package: impl Into<String>,
        min_version_code: u64,
        inspector: Arc<dyn AppInspector>,
        redirect: Arc<dyn StoreRedirect>,
    ) -> Self {
        Self {
            package: package.into(),
            min_version_code,
            inspector,
            redirect,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn min_version_code(&self) -> u64 {
        self.min_version_code
    }

    /// Whether the provider app is installed and recent enough.
    pub fn is_current(&self) -> bool {
        match self.inspector.installed_version_code(&self.package) {
            Some(version) if version >= self.min_version_code => {
                tracing::debug!(package = %self.package, version, "provider app installed");
                true
            }
            Some(version) => {
                tracing::debug!(
                    package = %self.package,
                    version,
                    required = self.min_version_code,
                    "provider app outdated"
                );
                false
            }
            None => {
                tracing::debug!(package = %self.package, "provider app not installed");
                false
            }
        }
    }

    /// Check currency, redirecting to the store when the app is unusable.
    ///
    /// Returns `true` when the caller may go ahead.
    pub fn ensure_current(&self, show_dialog: bool) -> bool {
        if self.is_current() {
            return true;
        }

        tracing::info!(package = %self.package, show_dialog, "redirecting to app store");
        self.redirect.redirect(&self.package, show_dialog);
        false
    }
}

impl std::fmt::Debug for ProviderApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderApp")
            .field("package", &self.package)
            .field("min_version_code", &self.min_version_code)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
