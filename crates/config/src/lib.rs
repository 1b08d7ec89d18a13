// Configuration loading

use std::path::PathBuf;

pub mod settings;
pub mod shortcuts;

pub use settings::Settings;
pub use shortcuts::Shortcuts;

/// Directory holding `settings.json` and `shortcuts.json`.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sheetsync")
}
