//! Routing-table seam — the proxy collaborator the registry mutates.
//!
//! The real implementation lives in the proxy crate; the registry only
//! needs registration, deregistration, and a presence check. The
//! reconciliation cycle never iterates the routing table directly — it
//! always goes through the registry's view.

use async_trait::async_trait;

/// The proxy's live connection-routing table.
#[async_trait]
pub trait RoutingTable: Send + Sync {
    /// Make `name` routable to `host:port`.
    async fn register(&self, name: &str, host: &str, port: u16) -> anyhow::Result<()>;

    /// Drop the route for `name`. Returns true if a route existed.
    async fn unregister(&self, name: &str) -> anyhow::Result<bool>;

    /// Whether a route exists for `name`.
    async fn is_registered(&self, name: &str) -> bool;
}
