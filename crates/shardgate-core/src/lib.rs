//! shardgate-core — shared domain model for the shardgate fleet registry.
//!
//! Holds the `Endpoint` entity (the registered game-server record), the
//! `PlayerRecord` used for ownership tracking, input validation, and the
//! daemon configuration (`GateConfig`, parsed from TOML).
//!
//! Identity is defined purely on the endpoint `name`: two records with the
//! same name are the same endpoint regardless of address or liveness.

pub mod config;
pub mod endpoint;
pub mod validate;

pub use config::{ApiConfig, DatabaseConfig, GateConfig, RegistrySettings};
pub use endpoint::{Endpoint, PlayerRecord};
pub use validate::{valid_name, valid_port, MAX_NAME_LEN, MIN_NAME_LEN};
