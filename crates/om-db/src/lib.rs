//! # om-db
//!
//! libSQL storage for the outcome mapping service.
//!
//! Holds users, projects and the partner → marker → {challenge, strategy}
//! hierarchy. Connections come from a bounded pool: a semaphore caps how many
//! are checked out at once and idle connections are reused. Every write that
//! touches marker ordering runs inside one `BEGIN IMMEDIATE` transaction, so
//! concurrent writers to the same partner are serialized by the database lock.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use libsql::{Builder, Connection};
use om_config::DatabaseConfig;
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use error::DatabaseError;

pub use service::OmService;

/// Bounded pool of libSQL connections over one database.
///
/// `:memory:` databases are private to the connection that opened them, so an
/// in-memory pool always holds exactly one connection.
pub struct OmDb {
    db: libsql::Database,
    idle: Arc<Mutex<Vec<Connection>>>,
    permits: Arc<Semaphore>,
    max_connections: usize,
    busy_timeout: Duration,
}

impl OmDb {
    /// Open the database described by `config`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        config
            .validate()
            .map_err(|e| DatabaseError::InvalidState(e.to_string()))?;

        let max_connections = if config.is_in_memory() {
            1
        } else {
            config.max_connections
        };

        let db = Builder::new_local(&config.path).build().await?;
        let om_db = Self {
            db,
            idle: Arc::new(Mutex::new(Vec::with_capacity(max_connections))),
            permits: Arc::new(Semaphore::new(max_connections)),
            max_connections,
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        };
        if !config.is_in_memory() {
            om_db.enable_wal().await?;
        }
        om_db.run_migrations().await?;
        tracing::debug!(path = %config.path, max_connections, "database opened");
        Ok(om_db)
    }

    /// Open a local database at `path` with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open(&DatabaseConfig {
            path: path.to_string(),
            ..DatabaseConfig::default()
        })
        .await
    }

    #[must_use]
    pub const fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Connections currently parked in the pool.
    #[must_use]
    pub fn idle_connections(&self) -> usize {
        self.idle.lock().len()
    }

    /// Check out a connection, waiting for a permit if the pool is exhausted.
    ///
    /// A reused connection left inside a transaction (its previous holder was
    /// cancelled mid-write) is rolled back before being handed out.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a new connection cannot be opened or configured.
    pub async fn conn(&self) -> Result<PooledConnection, DatabaseError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| DatabaseError::InvalidState(format!("connection pool closed: {e}")))?;

        let reused = self.idle.lock().pop();
        let conn = match reused {
            Some(conn) => {
                if !conn.is_autocommit() {
                    tracing::warn!("rolling back transaction abandoned by a cancelled request");
                    conn.execute("ROLLBACK", ()).await?;
                }
                conn
            }
            None => self.connect().await?,
        };

        Ok(PooledConnection {
            conn,
            idle: Arc::clone(&self.idle),
            _permit: permit,
        })
    }

    /// Switch a file database to WAL so readers do not block the writer.
    /// The mode is stored in the file and applies to every later connection.
    async fn enable_wal(&self) -> Result<(), DatabaseError> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query("PRAGMA journal_mode = WAL", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA journal_mode: {e}")))?;
        let mode = match rows.next().await? {
            Some(row) => row.get::<String>(0)?,
            None => String::new(),
        };
        tracing::debug!(%mode, "journal mode set");
        Ok(())
    }

    async fn connect(&self) -> Result<Connection, DatabaseError> {
        let conn = self.db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| DatabaseError::Migration(format!("busy_timeout: {e}")))?;
        Ok(conn)
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"pmk-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let conn = self.conn().await?;
        generate_id(&conn, prefix).await
    }
}

/// Generate a prefixed ID on an already checked-out connection.
///
/// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or returns no rows.
pub async fn generate_id(conn: &Connection, prefix: &str) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
            (),
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}

/// A connection on loan from [`OmDb`]. Returns to the pool on drop.
pub struct PooledConnection {
    conn: Connection,
    idle: Arc<Mutex<Vec<Connection>>>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        // `Connection` is a shared handle; the clone keeps it open in the pool.
        self.idle.lock().push(self.conn.clone());
    }
}
