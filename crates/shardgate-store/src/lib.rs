//! shardgate-store — durable persistence for the fleet registry.
//!
//! Backed by [sqlx](https://docs.rs/sqlx) over SQLite, holds the
//! authoritative record of every registered endpoint plus the
//! player-ownership table. Schema is created on connect.
//!
//! The `Store` is `Clone` + `Send` + `Sync` (backed by a bounded
//! `SqlitePool`) and can be shared across async tasks.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::Store;
