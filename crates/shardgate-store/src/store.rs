//! Store — sqlx/SQLite persistence for endpoint and player records.
//!
//! The `servers` table is the authoritative record of the fleet; the
//! registry's in-memory map is rebuilt from it at startup. Timestamps are
//! supplied by callers (they come in on the `Endpoint` itself), so tests
//! can backdate rows to exercise eviction.
//!
//! The player operations (`record_player_join`, `get_player`) persist
//! join tallies for the proxy's connection events; nothing feeds them
//! yet until the proxy emits those events.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use shardgate_core::{Endpoint, PlayerRecord};

use crate::error::{StoreError, StoreResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS servers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL UNIQUE,
    host        TEXT    NOT NULL,
    port        INTEGER NOT NULL,
    owner_id    TEXT    NOT NULL,
    owner_name  TEXT    NOT NULL,
    created_at  TEXT    NOT NULL,
    last_seen   TEXT    NOT NULL,
    is_online   INTEGER NOT NULL DEFAULT 0,
    description TEXT    NOT NULL DEFAULT '',
    max_players INTEGER NOT NULL DEFAULT 20,
    version     TEXT    NOT NULL DEFAULT 'unknown'
);
CREATE INDEX IF NOT EXISTS idx_servers_owner ON servers (owner_id);
CREATE INDEX IF NOT EXISTS idx_servers_last_seen ON servers (last_seen);

CREATE TABLE IF NOT EXISTS players (
    uuid        TEXT    PRIMARY KEY,
    username    TEXT    NOT NULL,
    first_join  TEXT    NOT NULL,
    last_join   TEXT    NOT NULL,
    last_server TEXT,
    join_count  INTEGER NOT NULL DEFAULT 1
);
CREATE INDEX IF NOT EXISTS idx_players_username ON players (username);
"#;

/// Row shape of the `servers` table; converted to `Endpoint` at the edge.
#[derive(sqlx::FromRow)]
struct ServerRow {
    name: String,
    host: String,
    port: i64,
    owner_id: String,
    owner_name: String,
    created_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    is_online: bool,
    description: String,
    max_players: i64,
    version: String,
}

impl From<ServerRow> for Endpoint {
    fn from(row: ServerRow) -> Self {
        Endpoint {
            name: row.name,
            host: row.host,
            port: row.port as u16,
            owner_id: row.owner_id,
            owner_name: row.owner_name,
            description: row.description,
            max_players: row.max_players as u32,
            version: row.version,
            online: row.is_online,
            last_seen: row.last_seen,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PlayerRow {
    uuid: String,
    username: String,
    first_join: DateTime<Utc>,
    last_join: DateTime<Utc>,
    last_server: Option<String>,
    join_count: i64,
}

impl From<PlayerRow> for PlayerRecord {
    fn from(row: PlayerRow) -> Self {
        PlayerRecord {
            uuid: row.uuid,
            username: row.username,
            first_join: row.first_join,
            last_join: row.last_join,
            last_server: row.last_server,
            join_count: row.join_count as u32,
        }
    }
}

/// Thread-safe durable store backed by a bounded SQLite pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect to (or create) the database at the given sqlx URL and run
    /// the schema migration.
    pub async fn connect(url: &str, pool_size: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Connect(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        let store = Self { pool };
        store.migrate().await?;
        debug!(%url, pool_size, "store connected");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    ///
    /// A single connection keeps every query on the same in-memory
    /// database.
    pub async fn connect_in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        let store = Self { pool };
        store.migrate().await?;
        debug!("in-memory store connected");
        Ok(store)
    }

    /// Create tables and indexes if they don't exist yet.
    async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Migrate(e.to_string()))?;
        Ok(())
    }

    // ── Servers ────────────────────────────────────────────────────

    /// Insert a new endpoint row. Timestamps come from the struct, so
    /// callers control them. A taken name surfaces as
    /// `StoreError::Duplicate`.
    pub async fn insert(&self, ep: &Endpoint) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO servers \
             (name, host, port, owner_id, owner_name, created_at, last_seen, \
              is_online, description, max_players, version) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&ep.name)
        .bind(&ep.host)
        .bind(ep.port as i64)
        .bind(&ep.owner_id)
        .bind(&ep.owner_name)
        .bind(ep.created_at)
        .bind(ep.last_seen)
        .bind(ep.online)
        .bind(&ep.description)
        .bind(ep.max_players as i64)
        .bind(&ep.version)
        .execute(&self.pool)
        .await?;
        debug!(name = %ep.name, addr = %ep.addr(), "endpoint row inserted");
        Ok(())
    }

    /// Delete an endpoint row by name. Returns true if a row existed.
    pub async fn delete(&self, name: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM servers WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;
        let existed = result.rows_affected() > 0;
        debug!(%name, existed, "endpoint row deleted");
        Ok(existed)
    }

    /// Set the online flag for an endpoint. `last_seen` is bumped only on
    /// a successful probe, so it always records the last reachability.
    /// Returns true if a row was updated.
    pub async fn update_online_status(&self, name: &str, online: bool) -> StoreResult<bool> {
        let result = if online {
            sqlx::query("UPDATE servers SET is_online = 1, last_seen = ? WHERE name = ?")
                .bind(Utc::now())
                .bind(name)
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query("UPDATE servers SET is_online = 0 WHERE name = ?")
                .bind(name)
                .execute(&self.pool)
                .await?
        };
        Ok(result.rows_affected() > 0)
    }

    /// Get an endpoint by name.
    pub async fn get(&self, name: &str) -> StoreResult<Option<Endpoint>> {
        let row = sqlx::query_as::<_, ServerRow>("SELECT * FROM servers WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Endpoint::from))
    }

    /// List every registered endpoint, newest first.
    pub async fn list_all(&self) -> StoreResult<Vec<Endpoint>> {
        let rows = sqlx::query_as::<_, ServerRow>(
            "SELECT * FROM servers ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Endpoint::from).collect())
    }

    /// List endpoints whose `last_seen` precedes now minus `retention`.
    pub async fn list_stale_since(&self, retention: Duration) -> StoreResult<Vec<Endpoint>> {
        let retention = chrono::Duration::from_std(retention)
            .map_err(|e| StoreError::Query(e.to_string()))?;
        let threshold = Utc::now() - retention;
        let rows = sqlx::query_as::<_, ServerRow>(
            "SELECT * FROM servers WHERE last_seen < ? ORDER BY last_seen ASC",
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Endpoint::from).collect())
    }

    /// Number of endpoints registered by an owner.
    pub async fn count_by_owner(&self, owner_id: &str) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM servers WHERE owner_id = ?")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Total number of endpoint rows.
    pub async fn count_all(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM servers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // ── Players ────────────────────────────────────────────────────

    /// Record a player join. First call inserts the record; subsequent
    /// calls refresh `username`, `last_server`, `last_join` and increment
    /// `join_count`.
    pub async fn record_player_join(
        &self,
        uuid: &str,
        username: &str,
        last_server: Option<&str>,
    ) -> StoreResult<()> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO players (uuid, username, first_join, last_join, last_server, join_count) \
             VALUES (?, ?, ?, ?, ?, 1) \
             ON CONFLICT(uuid) DO UPDATE SET \
               username = excluded.username, \
               last_join = excluded.last_join, \
               last_server = excluded.last_server, \
               join_count = players.join_count + 1",
        )
        .bind(uuid)
        .bind(username)
        .bind(now)
        .bind(now)
        .bind(last_server)
        .execute(&self.pool)
        .await?;
        debug!(%uuid, %username, "player join recorded");
        Ok(())
    }

    /// Get a player record by UUID.
    pub async fn get_player(&self, uuid: &str) -> StoreResult<Option<PlayerRecord>> {
        let row = sqlx::query_as::<_, PlayerRow>("SELECT * FROM players WHERE uuid = ?")
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PlayerRecord::from))
    }

    // ── Test support ───────────────────────────────────────────────

    /// Rewrite an endpoint's `last_seen` (used by tests to simulate
    /// elapsed retention time).
    pub async fn set_last_seen(&self, name: &str, last_seen: DateTime<Utc>) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE servers SET last_seen = ? WHERE name = ?")
            .bind(last_seen)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
