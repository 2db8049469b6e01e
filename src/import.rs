// Preset import flow

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use walkdir::WalkDir;

use crate::container;
use crate::db::schema::{self, Preset, PresetMeta};
use crate::error::{PresetError, Result};

/// A decoded container waiting to be written to the store.
#[derive(Debug, Clone)]
pub struct ImportCandidate {
    pub meta: PresetMeta,
    pub payload: Vec<u8>,
    /// File the candidate came from, for reporting.
    pub source: PathBuf,
    /// True when the store already holds this id, as of scan time.
    pub exists: bool,
}

/// One item passed over during a scan, with a user-visible reason.
#[derive(Debug)]
pub struct SkippedItem {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything a scan found under a source path.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub candidates: Vec<ImportCandidate>,
    pub skipped: Vec<SkippedItem>,
}

/// Result of writing candidates into the store.
#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub imported: Vec<PresetMeta>,
    /// Collisions where the overwrite confirmation was declined.
    pub declined: Vec<PresetMeta>,
}

/// Scan a file or directory for importable containers and decode them.
///
/// Orphan legacy siblings and malformed containers (including .dtp files
/// truncated by a crashed export) are recorded as skipped with a reason;
/// neither aborts the scan. Database errors do.
pub fn scan(conn: &Connection, source: &Path) -> Result<ScanOutcome> {
    if !source.exists() {
        return Err(PresetError::Other(format!(
            "Import path not found: {}",
            source.display()
        )));
    }

    let mut outcome = ScanOutcome::default();
    for path in candidate_paths(source) {
        let kind = match container::classify(&path) {
            None => continue,
            Some(Err(e)) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                outcome.skipped.push(SkippedItem {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
            Some(Ok(kind)) => kind,
        };

        match kind.read() {
            Ok((meta, payload)) => {
                let exists = schema::preset_exists(conn, meta.id)?;
                outcome.candidates.push(ImportCandidate {
                    meta,
                    payload,
                    source: kind.display_path().to_path_buf(),
                    exists,
                });
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", kind.display_path().display(), e);
                outcome.skipped.push(SkippedItem {
                    path: kind.display_path().to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}

/// Files to consider under `source`: the file itself, or the directory's
/// immediate children (the presets folder is flat), sorted for a stable
/// ordering.
fn candidate_paths(source: &Path) -> Vec<PathBuf> {
    if source.is_file() {
        return vec![source.to_path_buf()];
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(source)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();
    paths
}

/// Write candidates into the store.
///
/// `confirm` is consulted once per id collision; declining skips the item
/// without error. Collisions are re-checked here rather than trusting the
/// scan, since earlier items in the same batch may have introduced new ids.
pub fn import_candidates(
    conn: &Connection,
    candidates: Vec<ImportCandidate>,
    mut confirm: impl FnMut(&PresetMeta) -> Result<bool>,
) -> Result<ImportOutcome> {
    let mut outcome = ImportOutcome::default();

    for candidate in candidates {
        let ImportCandidate { meta, payload, .. } = candidate;

        if schema::preset_exists(conn, meta.id)? && !confirm(&meta)? {
            tracing::info!("Skipping preset {} ('{}'): overwrite declined", meta.id, meta.name);
            outcome.declined.push(meta);
            continue;
        }

        schema::upsert_preset(
            conn,
            &Preset {
                id: meta.id,
                name: meta.name.clone(),
                payload,
            },
        )?;
        outcome.imported.push(meta);
    }

    Ok(outcome)
}
