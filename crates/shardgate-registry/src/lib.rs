//! shardgate-registry — the in-process authority for the endpoint fleet.
//!
//! The `Registry` reconciles three sources of truth: its concurrency-safe
//! in-memory map, the durable store, and live network reachability. The
//! `Reconciler` is the periodic background task that refreshes liveness
//! and evicts endpoints unreachable past the retention window.
//!
//! The proxy's routing table is a constructor-passed collaborator behind
//! the `RoutingTable` trait; the registry mutates it on add/remove but
//! never owns it.

pub mod error;
pub mod reconciler;
pub mod registry;
pub mod routing;

pub use error::{RegistryError, RegistryResult};
pub use reconciler::{CycleOutcome, CycleReport, Reconciler, ReconcilerConfig};
pub use registry::{NewEndpoint, Registry, RegistryConfig};
pub use routing::RoutingTable;
