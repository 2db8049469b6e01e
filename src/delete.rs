// Preset delete flow

use rusqlite::Connection;

use crate::db::schema;
use crate::error::Result;

/// Delete the given preset ids from the store.
///
/// Callers pass an already-confirmed selection. Unknown ids are no-ops;
/// returns how many presets were actually removed.
pub fn delete_presets(conn: &Connection, ids: &[i64]) -> Result<usize> {
    let mut removed = 0;
    for &id in ids {
        if schema::delete_preset(conn, id)? {
            removed += 1;
        } else {
            tracing::debug!("Preset {} not in store, nothing to delete", id);
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::db::schema::{insert_preset, preset_exists, Preset};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn deletes_selected_ids() {
        let conn = test_conn();
        for id in [1, 2, 3] {
            insert_preset(
                &conn,
                &Preset {
                    id,
                    name: format!("p{id}"),
                    payload: vec![id as u8],
                },
            )
            .unwrap();
        }

        let removed = delete_presets(&conn, &[1, 3]).unwrap();

        assert_eq!(removed, 2);
        assert!(!preset_exists(&conn, 1).unwrap());
        assert!(preset_exists(&conn, 2).unwrap());
        assert!(!preset_exists(&conn, 3).unwrap());
    }

    #[test]
    fn deleting_missing_id_twice_is_a_no_op() {
        let conn = test_conn();
        assert_eq!(delete_presets(&conn, &[42]).unwrap(), 0);
        assert_eq!(delete_presets(&conn, &[42]).unwrap(), 0);
    }
}
