// Multi-select preset list
//
// Up/down navigates, space toggles, enter confirms, q or Esc cancels.
// Items already present in the store are rendered dim with a marker but stay
// selectable; the import flow asks before overwriting them.

use std::collections::HashSet;
use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::KeyCode;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};

use crate::error::Result;

pub struct SelectItem {
    pub label: String,
    /// Rendered dim with an "already in database" marker.
    pub existing: bool,
}

pub struct MultiSelect {
    title: String,
    items: Vec<SelectItem>,
}

impl MultiSelect {
    pub fn new(title: impl Into<String>, items: Vec<SelectItem>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }

    /// Run the selector. Returns None when cancelled, otherwise the chosen
    /// item indices in list order.
    pub fn run(&self) -> Result<Option<Vec<usize>>> {
        let mut stdout = io::stdout();
        execute!(stdout, Hide)?;
        let result = {
            let _raw = super::RawModeGuard::enter()?;
            self.event_loop(&mut stdout)
        };
        execute!(stdout, Show)?;
        result
    }

    fn event_loop(&self, stdout: &mut io::Stdout) -> Result<Option<Vec<usize>>> {
        let mut selected: HashSet<usize> = HashSet::new();
        let mut cursor = 0usize;
        let mut offset = 0usize;

        loop {
            let rows = visible_rows()?;
            if cursor < offset {
                offset = cursor;
            } else if cursor >= offset + rows {
                offset = cursor - rows + 1;
            }

            self.draw(stdout, &selected, cursor, offset, rows)?;

            match super::next_key_press()? {
                KeyCode::Up => cursor = cursor.saturating_sub(1),
                KeyCode::Down => {
                    if cursor + 1 < self.items.len() {
                        cursor += 1;
                    }
                }
                KeyCode::Char(' ') => {
                    if !selected.remove(&cursor) {
                        selected.insert(cursor);
                    }
                }
                KeyCode::Enter => {
                    let mut chosen: Vec<usize> = selected.into_iter().collect();
                    chosen.sort_unstable();
                    return Ok(Some(chosen));
                }
                KeyCode::Char('q') | KeyCode::Esc => return Ok(None),
                _ => {}
            }
        }
    }

    fn draw(
        &self,
        stdout: &mut io::Stdout,
        selected: &HashSet<usize>,
        cursor: usize,
        offset: usize,
        rows: usize,
    ) -> Result<()> {
        queue!(
            stdout,
            Clear(ClearType::All),
            MoveTo(0, 0),
            SetAttribute(Attribute::Bold),
            Print(&self.title),
            SetAttribute(Attribute::Reset),
            MoveTo(0, 1),
            Print("Use Up/Down to navigate, SPACE to select, ENTER to confirm, 'q' to cancel")
        )?;

        let end = (offset + rows).min(self.items.len());
        for (row, idx) in (offset..end).enumerate() {
            let item = &self.items[idx];
            let prefix = if selected.contains(&idx) { "[*]" } else { "[ ]" };
            let marker = if item.existing {
                "  (already in database)"
            } else {
                ""
            };

            queue!(stdout, MoveTo(0, row as u16 + 3))?;
            if idx == cursor {
                queue!(stdout, SetAttribute(Attribute::Reverse))?;
            } else if item.existing {
                queue!(stdout, SetAttribute(Attribute::Dim))?;
            }
            queue!(
                stdout,
                Print(format!("{prefix} {}{marker}", item.label)),
                SetAttribute(Attribute::Reset)
            )?;
        }

        stdout.flush()?;
        Ok(())
    }
}

fn visible_rows() -> io::Result<usize> {
    let (_, rows) = terminal::size()?;
    Ok((rows.saturating_sub(4) as usize).max(1))
}
