// Interactive menu loop
//
// Owns the read-navigate-act cycle; each action resolves a selection and a
// confirmation, hands them to the matching flow, and shows the outcome.

use std::collections::HashSet;
use std::io::{self, Write};
use std::path::PathBuf;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::KeyCode;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};
use rusqlite::Connection;

use crate::constants::PRESETS_FOLDER;
use crate::db::{self, schema};
use crate::error::{PresetError, Result};
use crate::import::{ImportCandidate, ScanOutcome};
use crate::{delete, export, import};

use super::select::{MultiSelect, SelectItem};

enum MenuChoice {
    Export,
    Import,
    Delete,
    Exit,
}

/// The database belongs to Draw Things; warn before touching it.
pub fn startup_warning() -> Result<()> {
    super::notice(&[
        "IMPORTANT WARNING".to_string(),
        String::new(),
        "Please ensure you have backed up your database file before proceeding.".to_string(),
        "Make sure Draw Things is NOT running while using this tool.".to_string(),
    ])
}

/// Show the default database path and offer to override it.
pub fn resolve_db_path() -> Result<PathBuf> {
    let default = db::default_db_path().ok_or_else(|| {
        PresetError::Other("Could not determine home directory; pass --db".to_string())
    })?;

    if !super::confirm(&format!(
        "Default database: {} -- use a different file?",
        default.display()
    ))? {
        return Ok(default);
    }

    let entered = super::read_line("Enter database path: ")?;
    if entered.trim().is_empty() {
        Ok(default)
    } else {
        Ok(PathBuf::from(entered))
    }
}

/// Menu loop. Per-action errors surface on screen and drop back to the menu;
/// only UI failures propagate.
pub fn run(conn: &Connection) -> Result<()> {
    loop {
        let action = match main_menu()? {
            MenuChoice::Export => handle_export(conn),
            MenuChoice::Import => handle_import(conn),
            MenuChoice::Delete => handle_delete(conn),
            MenuChoice::Exit => break,
        };
        if let Err(e) = action {
            super::notice(&[format!("Error: {e}")])?;
        }
    }
    Ok(())
}

fn main_menu() -> Result<MenuChoice> {
    let entries = ["Export presets", "Import presets", "Delete presets", "Exit"];
    let mut cursor = 0usize;

    let mut stdout = io::stdout();
    execute!(stdout, Hide)?;
    let choice = {
        let _raw = super::RawModeGuard::enter()?;
        loop {
            queue!(
                stdout,
                Clear(ClearType::All),
                MoveTo(0, 0),
                SetAttribute(Attribute::Bold),
                Print(format!("Preset Manager v{}", env!("CARGO_PKG_VERSION"))),
                SetAttribute(Attribute::Reset)
            )?;
            for (idx, entry) in entries.iter().enumerate() {
                queue!(stdout, MoveTo(2, idx as u16 + 2))?;
                if idx == cursor {
                    queue!(stdout, SetAttribute(Attribute::Reverse))?;
                }
                queue!(stdout, Print(entry), SetAttribute(Attribute::Reset))?;
            }
            stdout.flush()?;

            match super::next_key_press()? {
                KeyCode::Up => cursor = cursor.saturating_sub(1),
                KeyCode::Down => {
                    if cursor + 1 < entries.len() {
                        cursor += 1;
                    }
                }
                KeyCode::Enter => break cursor,
                KeyCode::Char('q') => break entries.len() - 1,
                _ => {}
            }
        }
    };
    execute!(stdout, Show)?;

    Ok(match choice {
        0 => MenuChoice::Export,
        1 => MenuChoice::Import,
        2 => MenuChoice::Delete,
        _ => MenuChoice::Exit,
    })
}

fn handle_export(conn: &Connection) -> Result<()> {
    let presets = schema::list_presets(conn)?;
    if presets.is_empty() {
        return super::notice(&["No presets to export".to_string()]);
    }

    let items = presets
        .iter()
        .map(|p| SelectItem {
            label: format!("{} (ID: {})", p.name, p.id),
            existing: false,
        })
        .collect();
    let chosen = match MultiSelect::new("Select Presets to Export", items).run()? {
        Some(indices) if !indices.is_empty() => indices,
        _ => return Ok(()),
    };
    let ids: Vec<i64> = chosen.iter().map(|&i| presets[i].id).collect();

    let dest = resolve_transfer_dir("export")?;
    let outcome = export::export_presets(conn, &ids, &dest)?;

    let mut lines = vec![format!(
        "Exported {} presets to {}",
        outcome.written.len(),
        dest.display()
    )];
    for (id, err) in &outcome.failed {
        lines.push(format!("  preset {id}: {err}"));
    }
    super::notice(&lines)
}

fn handle_import(conn: &Connection) -> Result<()> {
    let source = resolve_transfer_dir("import")?;
    let ScanOutcome { candidates, skipped } = import::scan(conn, &source)?;

    if candidates.is_empty() {
        let mut lines = vec!["No presets found in folder".to_string()];
        lines.extend(skipped_lines(&skipped));
        return super::notice(&lines);
    }

    let items = candidates
        .iter()
        .map(|c| SelectItem {
            label: format!("{} (ID: {})", c.meta.name, c.meta.id),
            existing: c.exists,
        })
        .collect();
    let chosen = match MultiSelect::new("Select Presets to Import", items).run()? {
        Some(indices) if !indices.is_empty() => indices,
        _ => return Ok(()),
    };

    let chosen: HashSet<usize> = chosen.into_iter().collect();
    let selected: Vec<ImportCandidate> = candidates
        .into_iter()
        .enumerate()
        .filter(|(i, _)| chosen.contains(i))
        .map(|(_, c)| c)
        .collect();

    let outcome = import::import_candidates(conn, selected, |meta| {
        super::confirm(&format!(
            "Preset {} ('{}') already exists. Overwrite?",
            meta.id, meta.name
        ))
    })?;

    let mut lines = vec![format!("Imported {} presets", outcome.imported.len())];
    if !outcome.declined.is_empty() {
        lines.push(format!(
            "Left {} existing presets untouched",
            outcome.declined.len()
        ));
    }
    lines.extend(skipped_lines(&skipped));
    super::notice(&lines)
}

fn handle_delete(conn: &Connection) -> Result<()> {
    let presets = schema::list_presets(conn)?;
    if presets.is_empty() {
        return super::notice(&["No presets to delete".to_string()]);
    }

    let items = presets
        .iter()
        .map(|p| SelectItem {
            label: format!("{} (ID: {})", p.name, p.id),
            existing: false,
        })
        .collect();
    let chosen = match MultiSelect::new("Select Presets to Delete", items).run()? {
        Some(indices) if !indices.is_empty() => indices,
        _ => return Ok(()),
    };
    let ids: Vec<i64> = chosen.iter().map(|&i| presets[i].id).collect();

    if !super::confirm(&format!("Delete {} presets?", ids.len()))? {
        return Ok(());
    }

    let removed = delete::delete_presets(conn, &ids)?;
    super::notice(&[format!("Deleted {} presets", removed)])
}

fn resolve_transfer_dir(verb: &str) -> Result<PathBuf> {
    let default = PathBuf::from(PRESETS_FOLDER);
    if super::confirm(&format!(
        "Default {verb} directory: {} -- use a custom path?",
        default.display()
    ))? {
        let entered = super::read_line(&format!("Enter {verb} path: "))?;
        if !entered.trim().is_empty() {
            return Ok(PathBuf::from(entered));
        }
    }
    Ok(default)
}

fn skipped_lines(skipped: &[import::SkippedItem]) -> Vec<String> {
    skipped
        .iter()
        .map(|item| format!("  skipped {}: {}", item.path.display(), item.reason))
        .collect()
}
