use std::sync::Arc;

use tracing::{debug, warn};

use super::session::Session;
use super::storage::{MemoryStorage, Storage};

/// Fixed storage key holding the session token
pub const SESSION_KEY: &str = "admin_token";

/// Owner of the current session.
///
/// Reads and writes go straight through to the storage backend, so every
/// clone (and every other process sharing a file backend) sees the same
/// session. None of the operations fail: storage errors are logged and a
/// failed read is reported as an absent session.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn Storage>,
}

impl CredentialStore {
    /// Bind the store to a storage backend
    pub fn init(storage: Arc<dyn Storage>) -> Self {
        let store = Self { storage };
        debug!(present = store.get().present(), "Credential store initialised");
        store
    }

    /// A store backed by process memory only
    pub fn in_memory() -> Self {
        Self::init(Arc::new(MemoryStorage::new()))
    }

    /// Read the current session from storage
    pub fn get(&self) -> Session {
        match self.storage.get_item(SESSION_KEY) {
            Ok(value) => Session::from_stored(value),
            Err(e) => {
                warn!(error = %e, "Failed to read session token, treating as logged out");
                Session::absent()
            }
        }
    }

    /// Persist `token`, replacing any previous session
    pub fn set(&self, token: &str) {
        if let Err(e) = self.storage.set_item(SESSION_KEY, token) {
            warn!(error = %e, "Failed to persist session token");
        }
    }

    /// Erase the session. Clearing an absent session is a no-op.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(SESSION_KEY) {
            warn!(error = %e, "Failed to clear session token");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().present()
    }
}
