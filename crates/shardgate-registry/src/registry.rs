//! Registry — the single in-process authority for registered endpoints.
//!
//! The in-memory map mirrors the durable store and the proxy's routing
//! table; the three stay eventually consistent except during the brief
//! window of an in-flight add or remove. Add persists to the store
//! *before* registering the route, so a store failure never leaves a
//! dangling route; a routing failure after a successful insert triggers a
//! best-effort compensating delete.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shardgate_core::{valid_name, valid_port, Endpoint};
use shardgate_store::{Store, StoreError};

use crate::error::{RegistryError, RegistryResult};
use crate::routing::RoutingTable;

/// Registry tuning knobs.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Timeout for the synchronous seed probe on add.
    pub probe_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
        }
    }
}

/// Input for registering a new endpoint. Description, capacity, and
/// version start at their defaults and live on the stored record.
#[derive(Debug, Clone)]
pub struct NewEndpoint {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub owner_id: String,
    pub owner_name: String,
}

/// The concurrency-safe name → endpoint authority.
///
/// All collaborators are constructor-passed; the registry holds no global
/// state. Same-name add/remove races resolve last-writer-wins in the map
/// — the store's unique constraint is the final backstop for identity.
pub struct Registry {
    store: Store,
    routing: Arc<dyn RoutingTable>,
    config: RegistryConfig,
    endpoints: RwLock<HashMap<String, Endpoint>>,
}

impl Registry {
    /// Create a new registry over the given store and routing table.
    pub fn new(store: Store, routing: Arc<dyn RoutingTable>, config: RegistryConfig) -> Self {
        Self {
            store,
            routing,
            config,
            endpoints: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new endpoint.
    ///
    /// Validates the input, rejects duplicates (advisory check — the
    /// store's unique constraint catches check/write races), seeds
    /// `online` with one synchronous probe, persists, registers the
    /// route, and inserts into the in-memory map. Returns the created
    /// endpoint.
    pub async fn add(&self, req: NewEndpoint) -> RegistryResult<Endpoint> {
        if !valid_name(&req.name) {
            return Err(RegistryError::InvalidName(req.name));
        }
        if !valid_port(req.port) {
            return Err(RegistryError::InvalidPort(req.port));
        }

        // Advisory duplicate check against both views.
        if self.routing.is_registered(&req.name).await
            || self.endpoints.read().await.contains_key(&req.name)
        {
            return Err(RegistryError::Duplicate(req.name));
        }

        // Seed probe: a failure is not an error, just offline.
        let online =
            shardgate_probe::probe(&req.host, req.port, self.config.probe_timeout).await;
        let endpoint = Endpoint::new(
            &req.name,
            &req.host,
            req.port,
            &req.owner_id,
            &req.owner_name,
            online,
        );

        // Persist before touching the routing table, so a store failure
        // leaves no route behind.
        match self.store.insert(&endpoint).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                return Err(RegistryError::Duplicate(endpoint.name));
            }
            Err(e) => return Err(e.into()),
        }

        if let Err(e) = self
            .routing
            .register(&endpoint.name, &endpoint.host, endpoint.port)
            .await
        {
            // Compensate the already-written row, best effort.
            if let Err(del) = self.store.delete(&endpoint.name).await {
                warn!(name = %endpoint.name, error = %del, "compensating delete failed");
            }
            return Err(RegistryError::Routing(e.to_string()));
        }

        self.endpoints
            .write()
            .await
            .insert(endpoint.name.clone(), endpoint.clone());

        info!(
            name = %endpoint.name,
            addr = %endpoint.addr(),
            owner = %endpoint.owner_id,
            online,
            "endpoint registered"
        );
        Ok(endpoint)
    }

    /// Deregister an endpoint: route first, then store row, then memory
    /// entry, so routing never references a store-absent endpoint.
    ///
    /// Idempotent — returns `Ok(true)` even when nothing was found, and
    /// errors only on a store failure. Safe to re-invoke.
    pub async fn remove(&self, name: &str) -> RegistryResult<bool> {
        match self.routing.unregister(name).await {
            Ok(existed) => debug!(%name, existed, "route removed"),
            Err(e) => warn!(%name, error = %e, "route removal failed, continuing"),
        }

        self.store.delete(name).await?;
        self.endpoints.write().await.remove(name);

        info!(%name, "endpoint deregistered");
        Ok(true)
    }

    /// Point read of the current in-memory snapshot.
    pub async fn lookup(&self, name: &str) -> Option<Endpoint> {
        self.endpoints.read().await.get(name).cloned()
    }

    /// Snapshot copy of every registered endpoint — callers are immune to
    /// concurrent mutation during iteration.
    pub async fn list_all(&self) -> Vec<Endpoint> {
        self.endpoints.read().await.values().cloned().collect()
    }

    /// Cached online flag; false when absent. No live probe.
    pub async fn is_online(&self, name: &str) -> bool {
        self.endpoints
            .read()
            .await
            .get(name)
            .map(|ep| ep.online)
            .unwrap_or(false)
    }

    /// Whether an endpoint is currently registered.
    pub async fn contains(&self, name: &str) -> bool {
        self.endpoints.read().await.contains_key(name)
    }

    /// Number of endpoints currently in memory.
    pub async fn len(&self) -> usize {
        self.endpoints.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.endpoints.read().await.is_empty()
    }

    /// Endpoints owned by `owner_id`, counted by the store — the
    /// authority for aggregate ownership, independent of what is loaded
    /// in memory.
    pub async fn count_by_owner(&self, owner_id: &str) -> RegistryResult<i64> {
        Ok(self.store.count_by_owner(owner_id).await?)
    }

    /// Load every stored endpoint at startup: register its route and
    /// populate the map. A per-row routing failure is logged and the row
    /// skipped; the load completes. Returns the number loaded.
    pub async fn bulk_load(&self) -> RegistryResult<usize> {
        let rows = self.store.list_all().await?;
        let total = rows.len();
        let mut loaded = 0;

        for ep in rows {
            if let Err(e) = self.routing.register(&ep.name, &ep.host, ep.port).await {
                warn!(name = %ep.name, error = %e, "route registration failed, skipping");
                continue;
            }
            self.endpoints.write().await.insert(ep.name.clone(), ep);
            loaded += 1;
        }

        info!(loaded, total, "bulk load complete");
        Ok(loaded)
    }

    /// Write a probe result through to the store row and the cached
    /// flag. Bumps `last_seen` only when the probe succeeded; called for
    /// every successful probe so a continuously-online endpoint stays
    /// fresh. Used by the reconciliation cycle's status refresh.
    pub(crate) async fn set_status(&self, name: &str, online: bool) -> RegistryResult<()> {
        self.store.update_online_status(name, online).await?;
        if let Some(ep) = self.endpoints.write().await.get_mut(name) {
            ep.online = online;
            if online {
                ep.last_seen = Utc::now();
            }
        }
        debug!(%name, online, "status refreshed");
        Ok(())
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory routing-table double used across this crate's tests.

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::routing::RoutingTable;

    #[derive(Default)]
    pub struct MockRouter {
        routes: Mutex<HashMap<String, (String, u16)>>,
        fail_names: Mutex<HashSet<String>>,
    }

    impl MockRouter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make `register` fail for this name.
        pub fn fail_register(&self, name: &str) {
            self.fail_names.lock().unwrap().insert(name.to_string());
        }

        pub fn route_count(&self) -> usize {
            self.routes.lock().unwrap().len()
        }

        pub fn target(&self, name: &str) -> Option<(String, u16)> {
            self.routes.lock().unwrap().get(name).cloned()
        }
    }

    #[async_trait]
    impl RoutingTable for MockRouter {
        async fn register(&self, name: &str, host: &str, port: u16) -> anyhow::Result<()> {
            if self.fail_names.lock().unwrap().contains(name) {
                anyhow::bail!("injected routing failure for {name}");
            }
            self.routes
                .lock()
                .unwrap()
                .insert(name.to_string(), (host.to_string(), port));
            Ok(())
        }

        async fn unregister(&self, name: &str) -> anyhow::Result<bool> {
            Ok(self.routes.lock().unwrap().remove(name).is_some())
        }

        async fn is_registered(&self, name: &str) -> bool {
            self.routes.lock().unwrap().contains_key(name)
        }
    }
}
