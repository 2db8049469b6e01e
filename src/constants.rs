// Preset manager constants

// Container format
pub const DTP_EXTENSION: &str = "dtp";
pub const LEGACY_META_EXTENSION: &str = "json";
pub const LEGACY_PAYLOAD_EXTENSION: &str = "bin";
// Width of the big-endian metadata length prefix at the start of a .dtp file
pub const METADATA_LEN_BYTES: usize = 4;

// Paths
pub const PRESETS_FOLDER: &str = "presets";
// Relative to the home directory
pub const DEFAULT_DB_PATH: &str =
    "Library/Containers/com.liuliu.draw-things/Data/Library/Application Support/config.sqlite3";

// Draw Things tables holding preset records
pub const CONFIG_TABLE: &str = "generationconfiguration";
pub const NAME_TABLE: &str = "generationconfiguration__f86";
