// Draw Things preset manager
//
// Exports presets from the app's SQLite config database to .dtp container
// files, imports .dtp files and legacy .json/.bin pairs back, and deletes
// stored presets.

pub mod constants;
pub mod container;
pub mod db;
pub mod delete;
pub mod error;
pub mod export;
pub mod import;
pub mod ui;
