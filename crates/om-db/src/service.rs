//! Service layer owning the store handle.
//!
//! `OmService` wraps `OmDb`. All repo methods are implemented as
//! `impl OmService` blocks under `repos/`, one file per entity. Writes that
//! must be atomic (marker append, move and delete) follow this protocol:
//!
//! 1. Check out one connection and `BEGIN IMMEDIATE`
//! 2. Re-read the scope (current order, sibling count) inside the transaction
//! 3. Execute the planned statements
//! 4. Re-check that the partner's orders are still exactly `1..=N`
//! 5. Commit, or roll back on any failure

use libsql::{Connection, Transaction, TransactionBehavior};
use om_config::DatabaseConfig;

use crate::OmDb;
use crate::error::DatabaseError;

pub struct OmService {
    db: OmDb,
}

impl OmService {
    /// Open the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        Ok(Self {
            db: OmDb::open(config).await?,
        })
    }

    /// Create from an existing `OmDb` (for testing).
    #[must_use]
    pub const fn from_db(db: OmDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &OmDb {
        &self.db
    }
}

/// Start an immediate (write-locking) transaction on `conn`.
pub(crate) async fn begin_immediate(conn: &Connection) -> Result<Transaction, DatabaseError> {
    Ok(conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .await?)
}

/// Commit `tx` if `result` is `Ok`, otherwise roll it back and pass the error on.
pub(crate) async fn finish<T>(
    tx: Transaction,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
