//! Sqlite persistence for habits and their daily logs.
//! The basic idea is:
//!  - `habits` holds one row per tracked habit, target value nullable, default value not.
//!  - `habit_logs` holds at most one row per (habit, day); logging again replaces the value.
//!  - Deleting a habit cascades to its logs.

pub mod entities;
pub mod habit_store;

use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS habits (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        kind TEXT NOT NULL,
        target_value REAL,
        default_value REAL NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS habit_logs (
        habit_id INTEGER NOT NULL REFERENCES habits (id) ON DELETE CASCADE,
        date TEXT NOT NULL,
        value REAL NOT NULL,
        PRIMARY KEY (habit_id, date)
    );
";

/// Opens the database file and prepares it for use. The schema is applied on every open, which
/// keeps first run and subsequent runs on the same path.
pub fn open_database(path: &Path) -> Result<Connection> {
    debug!("Opening database at {path:?}");
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database at {path:?}"))?;
    bootstrap_connection(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    bootstrap_connection(&conn)?;
    Ok(conn)
}

fn bootstrap_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
