pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

/// Errors surfaced by [`Database`] operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row matched the given id. Carries the entity name ("user", "thought").
    #[error("No {0} found with this id!")]
    NotFound(&'static str),

    /// A UNIQUE constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("DB lock poisoned: {0}")]
    Lock(String),

    /// A stored value could not be decoded back into its domain type.
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(err, msg) = &e {
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
                return DbError::Conflict(conflict_message(msg.as_deref().unwrap_or_default()));
            }
        }
        DbError::Sqlite(e)
    }
}

fn conflict_message(sqlite_msg: &str) -> String {
    if sqlite_msg.contains("users.username") {
        "username is already taken".into()
    } else if sqlite_msg.contains("users.email") {
        "email is already registered".into()
    } else {
        sqlite_msg.to_string()
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::init(conn)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.conn.lock().map_err(|e| DbError::Lock(e.to_string()))?;
        f(&conn)
    }

    /// Runs `f` inside a transaction. Commits on `Ok`, rolls back on `Err`.
    pub fn with_tx<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> DbResult<T>,
    {
        let mut conn = self.conn.lock().map_err(|e| DbError::Lock(e.to_string()))?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}
