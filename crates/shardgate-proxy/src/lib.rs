//! shardgate-proxy — the in-process routing table.
//!
//! Maps endpoint names to connectable targets for the proxy runtime.
//! Only the registry's add/remove/bulk-load paths mutate it; the
//! reconciliation cycle never reads it directly.

pub mod router;

pub use router::{RouteTarget, Router};
