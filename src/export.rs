// Preset export flow

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::constants::DTP_EXTENSION;
use crate::container;
use crate::db::schema::{self, PresetMeta};
use crate::error::{PresetError, Result};

/// Outcome of one export batch.
#[derive(Debug, Default)]
pub struct ExportOutcome {
    /// Ids successfully written, with the file each one landed in.
    pub written: Vec<(i64, PathBuf)>,
    /// Ids that failed, with the per-item error.
    pub failed: Vec<(i64, PresetError)>,
}

/// Export the given preset ids as .dtp files under `dest`.
///
/// An unusable destination is fatal. Everything after that is per-item: a
/// missing id or a failed write is recorded in the outcome and the batch
/// continues.
pub fn export_presets(conn: &Connection, ids: &[i64], dest: &Path) -> Result<ExportOutcome> {
    std::fs::create_dir_all(dest)
        .map_err(|e| PresetError::Directory(format!("{}: {}", dest.display(), e)))?;

    let mut outcome = ExportOutcome::default();
    let mut used_names = HashSet::new();

    for &id in ids {
        match export_one(conn, id, dest, &mut used_names) {
            Ok(path) => {
                tracing::info!("Exported preset {} to {}", id, path.display());
                outcome.written.push((id, path));
            }
            Err(e) => {
                tracing::warn!("Export of preset {} failed: {}", id, e);
                outcome.failed.push((id, e));
            }
        }
    }

    Ok(outcome)
}

fn export_one(
    conn: &Connection,
    id: i64,
    dest: &Path,
    used_names: &mut HashSet<String>,
) -> Result<PathBuf> {
    let preset = schema::get_preset(conn, id)?.ok_or(PresetError::NotFound(id))?;
    let bytes = container::encode(
        &PresetMeta {
            id: preset.id,
            name: preset.name.clone(),
        },
        &preset.payload,
    )?;

    let base = sanitize_name(&preset.name).unwrap_or_else(|| format!("preset-{id}"));
    let path = unique_path(dest, &base, used_names);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Pick `<base>.dtp`, appending `_1`, `_2`, ... while the name is taken by
/// this batch or by a file already on disk. Nothing is silently overwritten.
fn unique_path(dest: &Path, base: &str, used_names: &mut HashSet<String>) -> PathBuf {
    let mut candidate = base.to_string();
    let mut suffix = 0;
    loop {
        let path = dest.join(format!("{candidate}.{DTP_EXTENSION}"));
        if !used_names.contains(&candidate) && !path.exists() {
            used_names.insert(candidate);
            return path;
        }
        suffix += 1;
        candidate = format!("{base}_{suffix}");
    }
}

/// Reduce a preset name to a filesystem-safe stem.
///
/// Transliterates to ASCII, keeps alphanumerics plus `-`, `_`, and `.`, maps
/// everything else to `_` (collapsing runs), and trims trailing dots and
/// underscores. Returns None when nothing usable survives; the caller falls
/// back to an id-based name.
pub fn sanitize_name(name: &str) -> Option<String> {
    let transliterated = deunicode::deunicode(name);
    let mut out = String::with_capacity(transliterated.len());
    let mut last_was_filler = true; // also swallows leading fillers

    for ch in transliterated.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '.' {
            out.push(ch);
            last_was_filler = false;
        } else if !last_was_filler {
            out.push('_');
            last_was_filler = true;
        }
    }

    while out.ends_with('_') || out.ends_with('.') {
        out.pop();
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::db::schema::{insert_preset, Preset};
    use tempfile::TempDir;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn seed(conn: &Connection, id: i64, name: &str, payload: &[u8]) {
        insert_preset(
            conn,
            &Preset {
                id,
                name: name.to_string(),
                payload: payload.to_vec(),
            },
        )
        .unwrap();
    }

    #[test]
    fn missing_id_is_reported_without_aborting_the_batch() {
        let conn = test_conn();
        seed(&conn, 1, "Keeper", b"data");
        let tmp = TempDir::new().unwrap();

        let outcome = export_presets(&conn, &[1, 2], tmp.path()).unwrap();

        assert_eq!(outcome.written.len(), 1);
        assert_eq!(outcome.written[0].0, 1);
        assert!(outcome.written[0].1.exists());
        assert_eq!(outcome.failed.len(), 1);
        assert!(matches!(outcome.failed[0], (2, PresetError::NotFound(2))));
    }

    #[test]
    fn written_file_round_trips_through_decode() {
        let conn = test_conn();
        let payload = vec![9u8, 8, 7, 0, 255];
        seed(&conn, 11, "Round Trip", &payload);
        let tmp = TempDir::new().unwrap();

        let outcome = export_presets(&conn, &[11], tmp.path()).unwrap();
        let bytes = std::fs::read(&outcome.written[0].1).unwrap();
        let (meta, decoded_payload) = container::decode(&bytes).unwrap();

        assert_eq!(meta.id, 11);
        assert_eq!(meta.name, "Round Trip");
        assert_eq!(decoded_payload, payload);
    }

    #[test]
    fn same_name_presets_get_distinct_files() {
        let conn = test_conn();
        seed(&conn, 1, "Twin", b"a");
        seed(&conn, 2, "Twin", b"b");
        let tmp = TempDir::new().unwrap();

        let outcome = export_presets(&conn, &[1, 2], tmp.path()).unwrap();

        assert_eq!(outcome.written.len(), 2);
        assert_eq!(outcome.written[0].1, tmp.path().join("Twin.dtp"));
        assert_eq!(outcome.written[1].1, tmp.path().join("Twin_1.dtp"));
    }

    #[test]
    fn existing_file_on_disk_is_not_overwritten() {
        let conn = test_conn();
        seed(&conn, 1, "Taken", b"new");
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Taken.dtp"), b"old contents").unwrap();

        let outcome = export_presets(&conn, &[1], tmp.path()).unwrap();

        assert_eq!(outcome.written[0].1, tmp.path().join("Taken_1.dtp"));
        assert_eq!(
            std::fs::read(tmp.path().join("Taken.dtp")).unwrap(),
            b"old contents"
        );
    }

    #[test]
    fn destination_is_created_when_missing() {
        let conn = test_conn();
        seed(&conn, 1, "Deep", b"x");
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("nested").join("out");

        let outcome = export_presets(&conn, &[1], &dest).unwrap();
        assert_eq!(outcome.written.len(), 1);
        assert!(dest.join("Deep.dtp").exists());
    }

    #[test]
    fn unusable_destination_is_fatal() {
        let conn = test_conn();
        seed(&conn, 1, "Blocked", b"x");
        let tmp = TempDir::new().unwrap();
        // A regular file where the directory should go.
        let dest = tmp.path().join("not-a-dir");
        std::fs::write(&dest, b"").unwrap();

        let err = export_presets(&conn, &[1], &dest).unwrap_err();
        assert!(matches!(err, PresetError::Directory(_)), "got {err:?}");
    }

    #[test]
    fn sanitize_name_keeps_safe_characters() {
        assert_eq!(sanitize_name("Portrait v2.1"), Some("Portrait_v2.1".to_string()));
        assert_eq!(sanitize_name("Ångström preset"), Some("Angstrom_preset".to_string()));
        assert_eq!(sanitize_name("a/b\\c:d"), Some("a_b_c_d".to_string()));
    }

    #[test]
    fn sanitize_name_collapses_and_trims_fillers() {
        assert_eq!(sanitize_name("  spaced   out  "), Some("spaced_out".to_string()));
        assert_eq!(sanitize_name("dots..."), Some("dots".to_string()));
    }

    #[test]
    fn unusable_name_falls_back_to_id() {
        assert_eq!(sanitize_name("///"), None);
        assert_eq!(sanitize_name(""), None);

        let conn = test_conn();
        seed(&conn, 33, "///", b"x");
        let tmp = TempDir::new().unwrap();
        let outcome = export_presets(&conn, &[33], tmp.path()).unwrap();
        assert_eq!(outcome.written[0].1, tmp.path().join("preset-33.dtp"));
    }
}
