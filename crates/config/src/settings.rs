// Application settings
// Loaded from ~/.config/sheetsync/settings.json

use serde::{Deserialize, Serialize};
use sheetsync_core::SessionOptions;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Grid
    #[serde(rename = "grid.defaultWidth")]
    pub default_width: usize,

    // Sync
    #[serde(rename = "sync.flushOnQuit")]
    pub flush_on_quit: bool,

    #[serde(rename = "sync.rebaseAppends")]
    pub rebase_appends: bool,

    // Remote
    #[serde(rename = "sheets.apiBase")]
    pub sheets_api_base: String,

    #[serde(rename = "drive.apiBase")]
    pub drive_api_base: String,

    #[serde(rename = "sheets.timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_width: 5,
            flush_on_quit: true,
            rebase_appends: true,
            sheets_api_base: "https://sheets.googleapis.com".to_string(),
            drive_api_base: "https://www.googleapis.com".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Settings {
    /// Settings file inside `dir`
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(FILE_NAME)
    }

    /// Load from the default config directory
    pub fn load() -> Self {
        Self::load_from(&crate::config_dir())
    }

    /// Load settings from `dir`, falling back to defaults.
    /// A missing file is created with the defaults and comments.
    pub fn load_from(dir: &Path) -> Self {
        let path = Self::path_in(dir);

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(dir);
            return settings;
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines starting with `//`
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Session knobs derived from these settings
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            // A zero-width grid could never hold a cell.
            default_width: self.default_width.max(1),
            rebase_appends: self.rebase_appends,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Create default settings file with comments
    fn create_default_file(&self, dir: &Path) {
        if let Err(e) = fs::create_dir_all(dir) {
            log::warn!("Error creating config directory: {}", e);
            return;
        }

        let default_config = r#"{
    // Columns given to a worksheet that has no rows yet
    "grid.defaultWidth": 5,

    // Push pending edits when an edit session ends
    "sync.flushOnQuit": true,

    // Move locally appended rows below rows someone else added meanwhile
    "sync.rebaseAppends": true,

    // API roots (change only for proxies or testing)
    "sheets.apiBase": "https://sheets.googleapis.com",
    "drive.apiBase": "https://www.googleapis.com",
    "sheets.timeoutSecs": 60
}
"#;

        if let Err(e) = fs::write(Self::path_in(dir), default_config) {
            log::warn!("Error writing default {}: {}", FILE_NAME, e);
        }
    }
}
