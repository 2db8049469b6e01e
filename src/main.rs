// dtpresets CLI binary

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dtpresets::constants::PRESETS_FOLDER;
use dtpresets::db::{self, schema};
use dtpresets::{delete, export, import, ui};

#[derive(Parser)]
#[command(name = "dtpresets")]
#[command(about = "Manage Draw Things generation presets", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the Draw Things config database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored presets
    List,

    /// Export presets to .dtp files
    Export {
        /// Preset ids to export
        ids: Vec<i64>,
        /// Export every stored preset
        #[arg(long)]
        all: bool,
        /// Destination directory
        #[arg(short, long)]
        dest: Option<PathBuf>,
    },

    /// Import .dtp files or legacy .json/.bin pairs
    Import {
        /// Source file or directory
        path: Option<PathBuf>,
        /// Overwrite colliding presets without asking
        #[arg(long)]
        yes: bool,
    },

    /// Delete presets from the database
    Delete {
        /// Preset ids to delete
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List) => cmd_list(cli.db),
        Some(Commands::Export { ids, all, dest }) => cmd_export(cli.db, ids, all, dest),
        Some(Commands::Import { path, yes }) => cmd_import(cli.db, path, yes),
        Some(Commands::Delete { ids, yes }) => cmd_delete(cli.db, ids, yes),
        None => run_menu(cli.db),
    }
}

fn open_database(db: Option<PathBuf>) -> Result<Connection> {
    let path = match db {
        Some(path) => path,
        None => db::default_db_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory; pass --db"))?,
    };
    Ok(db::open_db(&path)?)
}

fn cmd_list(db: Option<PathBuf>) -> Result<()> {
    let conn = open_database(db)?;
    let presets = schema::list_presets(&conn)?;

    if presets.is_empty() {
        println!("No presets found.");
        return Ok(());
    }

    println!("{:>6}  {}", "ID", "Name");
    println!("{}", "-".repeat(40));
    for preset in &presets {
        println!("{:>6}  {}", preset.id, preset.name);
    }
    println!();
    println!("{} presets total", presets.len());

    Ok(())
}

fn cmd_export(
    db: Option<PathBuf>,
    ids: Vec<i64>,
    all: bool,
    dest: Option<PathBuf>,
) -> Result<()> {
    let conn = open_database(db)?;

    let ids = if all {
        schema::list_presets(&conn)?.iter().map(|p| p.id).collect()
    } else {
        ids
    };
    if ids.is_empty() {
        anyhow::bail!("Pass preset ids to export, or --all");
    }

    let dest = dest.unwrap_or_else(|| PathBuf::from(PRESETS_FOLDER));
    let outcome = export::export_presets(&conn, &ids, &dest)?;

    for (_, path) in &outcome.written {
        println!("Wrote {}", path.display());
    }
    for (id, err) in &outcome.failed {
        println!("Failed preset {id}: {err}");
    }
    println!();
    println!(
        "Exported {} of {} presets to {}",
        outcome.written.len(),
        outcome.written.len() + outcome.failed.len(),
        dest.display()
    );

    Ok(())
}

fn cmd_import(db: Option<PathBuf>, path: Option<PathBuf>, yes: bool) -> Result<()> {
    let conn = open_database(db)?;
    let source = path.unwrap_or_else(|| PathBuf::from(PRESETS_FOLDER));

    let scanned = import::scan(&conn, &source)?;
    for item in &scanned.skipped {
        println!("Skipped {}: {}", item.path.display(), item.reason);
    }
    if scanned.candidates.is_empty() {
        println!("No importable presets found at {}", source.display());
        return Ok(());
    }

    let outcome = import::import_candidates(&conn, scanned.candidates, |meta| {
        if yes {
            return Ok(true);
        }
        ui::confirm_inline(&format!(
            "Preset {} ('{}') already exists. Overwrite?",
            meta.id, meta.name
        ))
    })?;

    for meta in &outcome.imported {
        println!("Imported {} (ID: {})", meta.name, meta.id);
    }
    for meta in &outcome.declined {
        println!("Left {} (ID: {}) untouched", meta.name, meta.id);
    }
    println!();
    println!("Imported {} presets", outcome.imported.len());

    Ok(())
}

fn cmd_delete(db: Option<PathBuf>, ids: Vec<i64>, yes: bool) -> Result<()> {
    let conn = open_database(db)?;

    if !yes && !ui::confirm_inline(&format!("Delete {} presets?", ids.len()))? {
        println!("Cancelled.");
        return Ok(());
    }

    let removed = delete::delete_presets(&conn, &ids)?;
    println!("Deleted {} presets", removed);

    Ok(())
}

fn run_menu(db: Option<PathBuf>) -> Result<()> {
    ui::menu::startup_warning()?;

    let path = match db {
        Some(path) => path,
        None => ui::menu::resolve_db_path()?,
    };

    let conn = db::open_db(&path)?;
    ui::menu::run(&conn)?;

    Ok(())
}
