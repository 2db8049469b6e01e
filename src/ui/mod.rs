// Terminal UI
//
// The export/import/delete flows take already-resolved selections and
// confirmations as input; everything in this module exists to produce them.

pub mod menu;
pub mod select;

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};

use crate::error::Result;

/// Restores cooked mode when dropped, so early returns and errors cannot
/// leave the terminal raw.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn next_key_press() -> io::Result<KeyCode> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(key.code);
            }
        }
    }
}

/// Full-screen yes/no question. Only 'y' answers yes; any other key,
/// including enter, is no.
pub fn confirm(question: &str) -> Result<bool> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        Clear(ClearType::All),
        MoveTo(0, 0),
        SetAttribute(Attribute::Bold),
        Print(question),
        SetAttribute(Attribute::Reset),
        MoveTo(0, 2),
        Print("[y/N] ")
    )?;

    let _raw = RawModeGuard::enter()?;
    let key = next_key_press()?;
    Ok(matches!(key, KeyCode::Char('y') | KeyCode::Char('Y')))
}

/// Inline yes/no question for subcommand use; does not touch the screen.
pub fn confirm_inline(question: &str) -> Result<bool> {
    let answer = read_line(&format!("{question} [y/N] "))?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Prompt for one line of input in cooked mode.
pub fn read_line(prompt: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Full-screen notice, first line bold; waits for any key.
pub fn notice(lines: &[String]) -> Result<()> {
    let mut stdout = io::stdout();
    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    for (i, line) in lines.iter().enumerate() {
        queue!(stdout, MoveTo(0, i as u16))?;
        if i == 0 {
            queue!(stdout, SetAttribute(Attribute::Bold))?;
        }
        queue!(stdout, Print(line), SetAttribute(Attribute::Reset))?;
    }
    queue!(
        stdout,
        MoveTo(0, lines.len() as u16 + 1),
        Print("Press any key to continue...")
    )?;
    stdout.flush()?;

    let _raw = RawModeGuard::enter()?;
    next_key_press()?;
    Ok(())
}
