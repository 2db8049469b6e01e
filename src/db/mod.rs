// Database module

pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::constants::{CONFIG_TABLE, DEFAULT_DB_PATH, NAME_TABLE};
use crate::error::{PresetError, Result};

/// Open a Draw Things config database, verifying the preset tables exist.
///
/// The database belongs to the app; a missing file or missing tables almost
/// always mean a wrong path, so both fail with a clear message instead of
/// creating anything.
pub fn open_db(db_path: &Path) -> Result<Connection> {
    if !db_path.exists() {
        return Err(PresetError::Other(format!(
            "Database not found: {}",
            db_path.display()
        )));
    }

    let conn = Connection::open(db_path)?;

    if !has_preset_tables(&conn)? {
        return Err(PresetError::Other(format!(
            "{} does not look like a Draw Things config database (missing {} tables)",
            db_path.display(),
            CONFIG_TABLE
        )));
    }

    Ok(conn)
}

fn has_preset_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN (?1, ?2)",
        params![CONFIG_TABLE, NAME_TABLE],
        |row| row.get(0),
    )?;
    Ok(count == 2)
}

/// Create the preset tables in a fresh database.
///
/// The name table has no declared columns beyond `f86`; rows are addressed
/// through the implicit rowid, which insert/update statements set explicitly
/// to keep it in lockstep with the config table.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS generationconfiguration (
            __pk0 INTEGER NOT NULL,
            p BLOB
        );
        CREATE TABLE IF NOT EXISTS generationconfiguration__f86 (
            f86 TEXT
        );",
    )?;
    Ok(())
}

/// Default database location under the user's home directory.
pub fn default_db_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(DEFAULT_DB_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_db_rejects_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = open_db(&tmp.path().join("nope.sqlite3"));
        assert!(result.is_err());
    }

    #[test]
    fn open_db_rejects_foreign_database() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("other.sqlite3");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE unrelated (x INTEGER);")
                .unwrap();
        }
        let result = open_db(&path);
        assert!(result.is_err(), "a database without preset tables must be rejected");
    }

    #[test]
    fn open_db_accepts_initialized_database() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.sqlite3");
        {
            let conn = Connection::open(&path).unwrap();
            init_schema(&conn).unwrap();
        }
        assert!(open_db(&path).is_ok());
    }
}
