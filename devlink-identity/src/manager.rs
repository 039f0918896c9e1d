use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use tracing::debug;

use crate::client_id::{ClientId, derive_ephemeral};
use crate::error::Result;
use crate::platform::PlatformProvider;
use crate::store::IdentityStore;

/// Key the identifier is stored under in a registered identity store.
pub const CLIENT_ID_KEY: &str = "@REACTOTRON/clientId";

#[derive(Debug, Clone)]
enum Ephemeral {
    /// Last derived value; recomputed on the next read.
    Derived(ClientId),
    /// Set explicitly; returned until overwritten.
    Pinned(ClientId),
}

/// Resolves and records the client identifier.
///
/// A registered [`IdentityStore`] always wins for both reads and writes.
/// Without one, the identifier is derived from device metadata on every
/// read unless a caller pinned one with [`IdentityManager::set_client_id`].
///
/// The store may be registered at any time; every operation looks at the
/// store registered at the moment it runs.
pub struct IdentityManager {
    store: ArcSwapOption<Arc<dyn IdentityStore>>,
    ephemeral: Mutex<Option<Ephemeral>>,
    platform: Arc<dyn PlatformProvider>,
}

impl IdentityManager {
    pub fn new(platform: Arc<dyn PlatformProvider>) -> Self {
        Self {
            store: ArcSwapOption::empty(),
            ephemeral: Mutex::new(None),
            platform,
        }
    }

    pub fn set_identity_store(&self, store: Arc<dyn IdentityStore>) {
        self.store.store(Some(Arc::new(store)));
        debug!("identity store registered");
    }

    pub fn has_store(&self) -> bool {
        self.store.load().is_some()
    }

    /// Current identifier. With a store registered this is exactly what the
    /// store holds under [`CLIENT_ID_KEY`], possibly nothing.
    pub async fn get_client_id(&self, default_name: &str) -> Result<Option<ClientId>> {
        if let Some(store) = self.store.load_full() {
            let stored = store.get_item(CLIENT_ID_KEY).await?;
            return Ok(stored.map(ClientId::from));
        }
        Ok(Some(self.ephemeral_id(default_name)))
    }

    pub async fn set_client_id(&self, id: &ClientId) -> Result<()> {
        if let Some(store) = self.store.load_full() {
            store.set_item(CLIENT_ID_KEY, id.as_str()).await?;
            debug!(client_id = %id, "client id persisted");
            return Ok(());
        }
        *self.lock_ephemeral() = Some(Ephemeral::Pinned(id.clone()));
        debug!(client_id = %id, "client id pinned in memory");
        Ok(())
    }

    /// The identifier held in memory, if one was derived or pinned.
    pub fn cached(&self) -> Option<ClientId> {
        self.lock_ephemeral().as_ref().map(|e| match e {
            Ephemeral::Derived(id) | Ephemeral::Pinned(id) => id.clone(),
        })
    }

    fn ephemeral_id(&self, default_name: &str) -> ClientId {
        let mut slot = self.lock_ephemeral();
        if let Some(Ephemeral::Pinned(id)) = slot.as_ref() {
            return id.clone();
        }
        let id = derive_ephemeral(
            default_name,
            &self.platform.constants(),
            &self.platform.dimensions(),
        );
        *slot = Some(Ephemeral::Derived(id.clone()));
        id
    }

    fn lock_ephemeral(&self) -> std::sync::MutexGuard<'_, Option<Ephemeral>> {
        self.ephemeral.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for IdentityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityManager")
            .field("has_store", &self.has_store())
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}
