//! Persisted session.
//!
//! [`CredentialStore`] keeps at most one [`Credential`] for the host app. The
//! value is read from durable storage the first time it is needed and cached
//! for the rest of the process, including the "nothing stored" outcome.
//! Writes go to storage first and only then replace the cached value, so the
//! two never disagree.
//!
//! [`Session`] is the host-facing wrapper: current credential, validity,
//! initialisation from an existing token, and clearing.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::credential::Credential;
use crate::error::Result;
use crate::store::KeyValueStore;

/// Namespace the session is stored under.
pub const DEFAULT_NAMESPACE: &str = "li_shared_pref_store";

/// Key holding the saved credential.
pub const ACCESS_TOKEN_KEY: &str = "li_sdk_access_token";

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// Hydration state of the cached credential.
#[derive(Debug, Clone)]
enum Cached {
    /// Storage has not been read yet.
    Unloaded,
    /// Storage was read (or written); `None` means no credential.
    Loaded(Option<Credential>),
}

/// Write-through cache of the single persisted credential.
pub struct CredentialStore {
    store: Box<dyn KeyValueStore>,
    key: String,
    cached: Mutex<Cached>,
}

impl CredentialStore {
    /// Create a credential store over `store`, using [`ACCESS_TOKEN_KEY`].
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self::with_key(store, ACCESS_TOKEN_KEY)
    }

    /// Create a credential store over `store` using a custom key.
    pub fn with_key(store: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
            cached: Mutex::new(Cached::Unloaded),
        }
    }

    /// The current credential, reading storage on first access.
    ///
    /// Unreadable or malformed stored data is treated as "no credential".
    pub fn get(&self) -> Option<Credential> {
        let mut cached = self.lock();
        if let Cached::Loaded(credential) = &*cached {
            return credential.clone();
        }

        let credential = self.recover();
        *cached = Cached::Loaded(credential.clone());
        credential
    }

    /// Replace the credential and persist it before returning.
    ///
    /// `None` deletes the stored key. On a storage error the cached value is
    /// left as it was.
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error if the write fails.
    pub fn set(&self, credential: Option<Credential>) -> Result<()> {
        let mut cached = self.lock();

        match &credential {
            Some(credential) => {
                let saved = credential.save()?;
                self.store.put(&self.key, &saved)?;
                tracing::info!(expires_on = credential.expires_on(), "session credential saved");
            }
            None => {
                self.store.remove(&self.key)?;
                tracing::info!("session credential cleared");
            }
        }

        *cached = Cached::Loaded(credential);
        Ok(())
    }

    fn recover(&self) -> Option<Credential> {
        let saved = match self.store.get(&self.key) {
            Ok(saved) => saved?,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session, treating as empty");
                return None;
            }
        };

        match Credential::recover(&saved) {
            Ok(credential) => {
                tracing::debug!("session credential recovered from storage");
                Some(credential)
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored session is malformed, treating as empty");
                None
            }
        }
    }

    // The cache is a plain value; a panic elsewhere cannot leave it torn.
    fn lock(&self) -> MutexGuard<'_, Cached> {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("key", &self.key)
            .field("cached", &*self.lock())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The host app's authorization session.
///
/// A session is valid while it holds a credential whose expiry is strictly
/// in the future. Validity is purely local: a token the member has revoked
/// on the provider side still reports valid until it expires.
#[derive(Debug)]
pub struct Session {
    credentials: CredentialStore,
}

impl Session {
    /// Create a session persisted in `store`.
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            credentials: CredentialStore::new(store),
        }
    }

    /// Create a session over an existing credential store.
    pub fn from_credential_store(credentials: CredentialStore) -> Self {
        Self { credentials }
    }

    /// The current credential, if any.
    pub fn credential(&self) -> Option<Credential> {
        self.credentials.get()
    }

    /// Replace the current credential (`None` clears it).
    pub fn set(&self, credential: Option<Credential>) -> Result<()> {
        self.credentials.set(credential)
    }

    /// Initialise the session with a token the host obtained earlier.
    pub fn init(&self, credential: Credential) -> Result<()> {
        self.set(Some(credential))
    }

    /// Drop the credential. Delegated actions stop working until the host
    /// authorizes again.
    pub fn clear(&self) -> Result<()> {
        self.set(None)
    }

    /// Whether a usable credential is present right now.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Whether a usable credential is present at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.credential()
            .is_some_and(|credential| !credential.is_expired_at(now))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
