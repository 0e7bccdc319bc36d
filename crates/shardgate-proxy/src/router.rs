//! Connection routing — resolves endpoint names to network targets.
//!
//! The router holds the live table the proxy consults when a player is
//! sent to a named server. Each name maps to exactly one target; there is
//! no pooling or load balancing because names are unique endpoints.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::debug;

use shardgate_registry::RoutingTable;

/// A connectable backend target.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RouteTarget {
    pub host: String,
    pub port: u16,
}

impl RouteTarget {
    /// Full address string.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Routes endpoint names to their network targets.
#[derive(Clone)]
pub struct Router {
    routes: Arc<RwLock<HashMap<String, RouteTarget>>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolve a name to its target, if routed.
    pub fn lookup(&self, name: &str) -> Option<RouteTarget> {
        let routes = self.routes.read().expect("routes lock");
        routes.get(name).cloned()
    }

    /// Number of routed names.
    pub fn len(&self) -> usize {
        let routes = self.routes.read().expect("routes lock");
        routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All routed names.
    pub fn names(&self) -> Vec<String> {
        let routes = self.routes.read().expect("routes lock");
        routes.keys().cloned().collect()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoutingTable for Router {
    async fn register(&self, name: &str, host: &str, port: u16) -> anyhow::Result<()> {
        let mut routes = self.routes.write().expect("routes lock");
        routes.insert(
            name.to_string(),
            RouteTarget {
                host: host.to_string(),
                port,
            },
        );
        debug!(%name, %host, port, "route registered");
        Ok(())
    }

    async fn unregister(&self, name: &str) -> anyhow::Result<bool> {
        let mut routes = self.routes.write().expect("routes lock");
        let existed = routes.remove(name).is_some();
        debug!(%name, existed, "route unregistered");
        Ok(existed)
    }

    async fn is_registered(&self, name: &str) -> bool {
        let routes = self.routes.read().expect("routes lock");
        routes.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_and_lookup() {
        let router = Router::new();
        router.register("alpha", "10.0.0.1", 25565).await.unwrap();

        let target = router.lookup("alpha").unwrap();
        assert_eq!(target.endpoint(), "10.0.0.1:25565");
        assert!(router.is_registered("alpha").await);
    }

    #[tokio::test]
    async fn register_overwrites_target() {
        let router = Router::new();
        router.register("alpha", "10.0.0.1", 25565).await.unwrap();
        router.register("alpha", "10.0.0.2", 30000).await.unwrap();

        assert_eq!(router.len(), 1);
        assert_eq!(router.lookup("alpha").unwrap().endpoint(), "10.0.0.2:30000");
    }

    #[tokio::test]
    async fn unregister_reports_presence() {
        let router = Router::new();
        router.register("alpha", "10.0.0.1", 25565).await.unwrap();

        assert!(router.unregister("alpha").await.unwrap());
        assert!(!router.unregister("alpha").await.unwrap());
        assert!(router.lookup("alpha").is_none());
    }

    #[tokio::test]
    async fn unknown_names_resolve_to_nothing() {
        let router = Router::new();
        assert!(router.lookup("nope").is_none());
        assert!(!router.is_registered("nope").await);
        assert!(router.is_empty());
    }

    #[tokio::test]
    async fn names_lists_all_routes() {
        let router = Router::new();
        router.register("alpha", "10.0.0.1", 25565).await.unwrap();
        router.register("beta", "10.0.0.2", 25566).await.unwrap();

        let mut names = router.names();
        names.sort();
        assert_eq!(names, vec!["alpha", "beta"]);
    }
}
