//! Domain types for the fleet registry.
//!
//! `Endpoint` is the central entity: a registered backend game server with
//! a unique name, a connectable address, an owner, and cached liveness.
//! All types serialize with serde for the store and the API surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Default player capacity for a freshly registered endpoint.
pub const DEFAULT_MAX_PLAYERS: u32 = 20;

/// Default version tag when the owner did not supply one.
pub const DEFAULT_VERSION: &str = "unknown";

/// A registered backend game-server endpoint.
///
/// Equality and hashing are defined on `name` alone — the name is the sole
/// identity key, enforced by both the registry and the store's unique
/// constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// Unique endpoint name (3–32 chars, alphanumeric plus `-`/`_`).
    pub name: String,
    /// Hostname or IP the proxy connects to.
    pub host: String,
    /// TCP port (1–65535).
    pub port: u16,
    /// Opaque stable identifier of the owning user.
    pub owner_id: String,
    /// Owner display name; may change independently of ownership.
    pub owner_name: String,
    /// Free-text description; may be empty.
    pub description: String,
    /// Advertised player capacity.
    pub max_players: u32,
    /// Free-form version tag.
    pub version: String,
    /// Cached reachability flag from the most recent probe.
    pub online: bool,
    /// Updated on creation and on every successful probe — never on a
    /// failed one, so eviction measures time since last reachability.
    pub last_seen: DateTime<Utc>,
    /// Set once at registration.
    pub created_at: DateTime<Utc>,
}

impl Endpoint {
    /// Build a new endpoint with default metadata and both timestamps set
    /// to now. `online` comes from the caller's seed probe.
    pub fn new(
        name: &str,
        host: &str,
        port: u16,
        owner_id: &str,
        owner_name: &str,
        online: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            host: host.to_string(),
            port,
            owner_id: owner_id.to_string(),
            owner_name: owner_name.to_string(),
            description: String::new(),
            max_players: DEFAULT_MAX_PLAYERS,
            version: DEFAULT_VERSION.to_string(),
            online,
            last_seen: now,
            created_at: now,
        }
    }

    /// Connectable `host:port` address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Endpoint {}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Ownership-tracking record for a player, keyed by UUID.
///
/// Maintained by the store's join-tracking upsert; outside the registry's
/// concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub uuid: String,
    pub username: String,
    pub first_join: DateTime<Utc>,
    pub last_join: DateTime<Utc>,
    /// Name of the endpoint the player last connected to, if any.
    pub last_server: Option<String>,
    pub join_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn new_endpoint_defaults() {
        let ep = Endpoint::new("alpha", "10.0.0.1", 25565, "owner-1", "Bob", true);
        assert_eq!(ep.name, "alpha");
        assert_eq!(ep.addr(), "10.0.0.1:25565");
        assert_eq!(ep.description, "");
        assert_eq!(ep.max_players, DEFAULT_MAX_PLAYERS);
        assert_eq!(ep.version, DEFAULT_VERSION);
        assert!(ep.online);
        assert_eq!(ep.last_seen, ep.created_at);
    }

    #[test]
    fn equality_is_name_only() {
        let a = Endpoint::new("alpha", "10.0.0.1", 25565, "owner-1", "Bob", true);
        let mut b = Endpoint::new("alpha", "10.0.0.2", 30000, "owner-2", "Eve", false);
        assert_eq!(a, b);

        b.name = "beta".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn hash_follows_name() {
        let mut set = HashSet::new();
        set.insert(Endpoint::new("alpha", "10.0.0.1", 25565, "o1", "Bob", true));
        // Same name, different address — still one entry.
        set.insert(Endpoint::new("alpha", "10.0.0.9", 26000, "o2", "Eve", false));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn endpoint_serde_round_trip() {
        let ep = Endpoint::new("alpha", "10.0.0.1", 25565, "owner-1", "Bob", false);
        let json = serde_json::to_string(&ep).unwrap();
        let back: Endpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back.host, ep.host);
        assert_eq!(back.port, ep.port);
        assert_eq!(back.online, ep.online);
    }
}
