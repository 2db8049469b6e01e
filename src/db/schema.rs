// Preset row types and query helpers
//
// Draw Things stores each preset across two tables joined on rowid:
// generationconfiguration carries the id (__pk0) and payload blob (p),
// generationconfiguration__f86 carries the display name (f86).

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identifying metadata of one preset. Field order fixes the JSON key order
/// in exported containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetMeta {
    pub id: i64,
    pub name: String,
}

/// Full preset record including the opaque payload blob. The payload is
/// carried end-to-end untouched; nothing in this crate interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub id: i64,
    pub name: String,
    pub payload: Vec<u8>,
}

/// All presets in the store, payloads excluded. Rows with a zero id are
/// app-internal and never listed.
pub fn list_presets(conn: &Connection) -> Result<Vec<PresetMeta>> {
    let mut stmt = conn.prepare(
        "SELECT gc.__pk0, f86.f86
         FROM generationconfiguration gc
         JOIN generationconfiguration__f86 f86 ON gc.rowid = f86.rowid
         WHERE gc.__pk0 != 0
         ORDER BY gc.rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(PresetMeta {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    let mut presets = Vec::new();
    for row in rows {
        presets.push(row?);
    }
    Ok(presets)
}

pub fn get_preset(conn: &Connection, id: i64) -> Result<Option<Preset>> {
    let result = conn
        .query_row(
            "SELECT gc.__pk0, f86.f86, gc.p
             FROM generationconfiguration gc
             JOIN generationconfiguration__f86 f86 ON gc.rowid = f86.rowid
             WHERE gc.__pk0 = ?1",
            params![id],
            |row| {
                Ok(Preset {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    payload: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(result)
}

pub fn preset_exists(conn: &Connection, id: i64) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM generationconfiguration WHERE __pk0 = ?1",
            params![id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn find_rowid(conn: &Connection, id: i64) -> Result<Option<i64>> {
    let rowid = conn
        .query_row(
            "SELECT rowid FROM generationconfiguration WHERE __pk0 = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(rowid)
}

/// Insert a new preset. Both tables are written in one transaction so a
/// failure cannot leave a config row without its name row.
pub fn insert_preset(conn: &Connection, preset: &Preset) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO generationconfiguration (__pk0, p) VALUES (?1, ?2)",
        params![preset.id, preset.payload],
    )?;
    let rowid = tx.last_insert_rowid();
    tx.execute(
        "INSERT INTO generationconfiguration__f86 (rowid, f86) VALUES (?1, ?2)",
        params![rowid, preset.name],
    )?;
    tx.commit()?;
    Ok(())
}

/// Insert or replace by preset id. An existing record keeps its rowid; only
/// the name and payload change.
pub fn upsert_preset(conn: &Connection, preset: &Preset) -> Result<()> {
    match find_rowid(conn, preset.id)? {
        Some(rowid) => {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "UPDATE generationconfiguration SET p = ?1 WHERE rowid = ?2",
                params![preset.payload, rowid],
            )?;
            tx.execute(
                "UPDATE generationconfiguration__f86 SET f86 = ?1 WHERE rowid = ?2",
                params![preset.name, rowid],
            )?;
            tx.commit()?;
            Ok(())
        }
        None => insert_preset(conn, preset),
    }
}

/// Remove a preset by id from both tables. Returns false when the id was not
/// present; deleting again is a no-op.
pub fn delete_preset(conn: &Connection, id: i64) -> Result<bool> {
    let tx = conn.unchecked_transaction()?;
    let mut removed = false;

    let rowids: Vec<i64> = {
        let mut stmt =
            tx.prepare("SELECT rowid FROM generationconfiguration WHERE __pk0 = ?1")?;
        let rows = stmt.query_map(params![id], |row| row.get(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        out
    };

    for rowid in rowids {
        tx.execute(
            "DELETE FROM generationconfiguration WHERE rowid = ?1",
            params![rowid],
        )?;
        tx.execute(
            "DELETE FROM generationconfiguration__f86 WHERE rowid = ?1",
            params![rowid],
        )?;
        removed = true;
    }

    tx.commit()?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn sample(id: i64, name: &str, payload: &[u8]) -> Preset {
        Preset {
            id,
            name: name.to_string(),
            payload: payload.to_vec(),
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = test_conn();
        let preset = sample(5, "Portrait", b"\x00\x01\x02");
        insert_preset(&conn, &preset).unwrap();

        let loaded = get_preset(&conn, 5).unwrap().unwrap();
        assert_eq!(loaded, preset);
        assert!(preset_exists(&conn, 5).unwrap());
        assert!(!preset_exists(&conn, 6).unwrap());
    }

    #[test]
    fn list_skips_zero_id_rows() {
        let conn = test_conn();
        insert_preset(&conn, &sample(0, "internal", b"")).unwrap();
        insert_preset(&conn, &sample(3, "Landscape", b"xyz")).unwrap();

        let listed = list_presets(&conn).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, 3);
        assert_eq!(listed[0].name, "Landscape");
    }

    #[test]
    fn upsert_replaces_name_and_payload() {
        let conn = test_conn();
        insert_preset(&conn, &sample(9, "Old", b"old")).unwrap();

        upsert_preset(&conn, &sample(9, "New", b"new")).unwrap();

        let loaded = get_preset(&conn, 9).unwrap().unwrap();
        assert_eq!(loaded.name, "New");
        assert_eq!(loaded.payload, b"new");
        assert_eq!(list_presets(&conn).unwrap().len(), 1);
    }

    #[test]
    fn upsert_inserts_when_absent() {
        let conn = test_conn();
        upsert_preset(&conn, &sample(4, "Fresh", b"p")).unwrap();
        assert!(preset_exists(&conn, 4).unwrap());
    }

    #[test]
    fn delete_removes_both_rows_and_is_idempotent() {
        let conn = test_conn();
        insert_preset(&conn, &sample(7, "Gone", b"data")).unwrap();

        assert!(delete_preset(&conn, 7).unwrap());
        assert!(get_preset(&conn, 7).unwrap().is_none());

        let names: i64 = conn
            .query_row("SELECT COUNT(*) FROM generationconfiguration__f86", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(names, 0, "name row must go with the config row");

        assert!(!delete_preset(&conn, 7).unwrap());
    }
}
