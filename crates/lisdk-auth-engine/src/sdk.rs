//! The SDK context object.
//!
//! A host builds one [`Sdk`] at startup and shares it. It owns the
//! [`Session`] and both coordinators, wired to the same session, channel and
//! provider app.

use std::path::PathBuf;
use std::sync::Arc;

use lisdk_vault::{CredentialStore, KeyValueStore, MemoryStore, Session, SqliteStore};

use crate::app::{AppInspector, ProviderApp, StoreRedirect};
use crate::authorization::AuthorizationCoordinator;
use crate::channel::{ProviderChannel, TargetApp};
use crate::config::SdkConfig;
use crate::deep_link::DeepLinkCoordinator;
use crate::error::{AuthEngineError, Result};

/// Where the credential record lives.
#[derive(Clone, Default)]
pub enum StorageBackend {
    /// Process memory; lost on exit.
    #[default]
    Memory,
    /// SQLite database at the given path.
    Sqlite(PathBuf),
    /// Host-supplied store.
    Custom(Arc<dyn KeyValueStore>),
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => f.write_str("Memory"),
            Self::Sqlite(path) => f.debug_tuple("Sqlite").field(path).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sdk
// ---------------------------------------------------------------------------

/// Session plus coordinators for one host process.
#[derive(Debug)]
pub struct Sdk {
    config: SdkConfig,
    session: Arc<Session>,
    authorization: AuthorizationCoordinator,
    deep_link: DeepLinkCoordinator,
}

impl Sdk {
    pub fn builder() -> SdkBuilder {
        SdkBuilder::default()
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn authorization(&self) -> &AuthorizationCoordinator {
        &self.authorization
    }

    pub fn deep_link(&self) -> &DeepLinkCoordinator {
        &self.deep_link
    }
}

// ---------------------------------------------------------------------------
// SdkBuilder
// ---------------------------------------------------------------------------

/// Assembles an [`Sdk`].
///
/// A channel, an app inspector and a store redirect are required; storage
/// defaults to memory and configuration to [`SdkConfig::default`].
#[derive(Default)]
pub struct SdkBuilder {
    config: SdkConfig,
    storage: StorageBackend,
    channel: Option<Arc<dyn ProviderChannel>>,
    inspector: Option<Arc<dyn AppInspector>>,
    redirect: Option<Arc<dyn StoreRedirect>>,
}

impl SdkBuilder {
    pub fn config(mut self, config: SdkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn storage(mut self, storage: StorageBackend) -> Self {
        self.storage = storage;
        self
    }

    pub fn channel(mut self, channel: Arc<dyn ProviderChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn inspector(mut self, inspector: Arc<dyn AppInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    pub fn redirect(mut self, redirect: Arc<dyn StoreRedirect>) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Validate the configuration, open storage and wire everything up.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for an invalid configuration or a missing
    /// collaborator; `VaultError` if the SQLite store cannot be opened.
    pub fn build(self) -> Result<Sdk> {
        self.config.validate()?;

        let channel = self.channel.ok_or_else(|| missing("channel"))?;
        let inspector = self.inspector.ok_or_else(|| missing("inspector"))?;
        let redirect = self.redirect.ok_or_else(|| missing("redirect"))?;

        let store: Arc<dyn KeyValueStore> = match &self.storage {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::Sqlite(path) => {
                Arc::new(SqliteStore::open(path, &self.config.storage_namespace)?)
            }
            StorageBackend::Custom(store) => Arc::clone(store),
        };
        let credentials = CredentialStore::with_key(store, &self.config.storage_key);
        let session = Arc::new(Session::from_credential_store(credentials));

        let app = ProviderApp::new(
            &self.config.provider_package,
            self.config.min_app_version_code,
            inspector,
            redirect,
        );
        let target = TargetApp {
            package: self.config.provider_package.clone(),
            component: Some(self.config.authorize_component.clone()),
        };

        let authorization = AuthorizationCoordinator::new(
            Arc::clone(&session),
            app.clone(),
            Arc::clone(&channel),
            target,
        )
        .with_store_dialog(self.config.show_store_dialog);
        let deep_link = DeepLinkCoordinator::new(
            Arc::clone(&session),
            app,
            channel,
            &self.config.sdk_source_tag,
        )
        .with_store_dialog(self.config.show_store_dialog);

        tracing::info!(
            storage = ?self.storage,
            provider = %self.config.provider_package,
            "sdk initialised"
        );

        Ok(Sdk {
            config: self.config,
            session,
            authorization,
            deep_link,
        })
    }
}

fn missing(what: &str) -> AuthEngineError {
    AuthEngineError::InvalidConfig {
        reason: format!("no {what} configured"),
    }
}
