//! Named shortcuts for spreadsheet ids.
//!
//! Stored as a flat JSON object in `~/.config/sheetsync/shortcuts.json`:
//!
//! ```json
//! { "hours": "1AbC...", "invoices": "1XyZ..." }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sheetsync_core::AliasResolver;

const FILE_NAME: &str = "shortcuts.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shortcuts {
    entries: BTreeMap<String, String>,
}

impl Shortcuts {
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(FILE_NAME)
    }

    pub fn load() -> Result<Self, String> {
        Self::load_from(&crate::config_dir())
    }

    /// Missing file means no shortcuts yet.
    pub fn load_from(dir: &Path) -> Result<Self, String> {
        let path = Self::path_in(dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
        serde_json::from_str(&contents).map_err(|e| format!("{}: {}", path.display(), e))
    }

    pub fn save_to(&self, dir: &Path) -> Result<(), String> {
        fs::create_dir_all(dir).map_err(|e| e.to_string())?;
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(Self::path_in(dir), json + "\n").map_err(|e| e.to_string())
    }

    /// Add or replace a shortcut. A leading `@` on the name is dropped.
    /// Returns the id it previously pointed at.
    pub fn add(&mut self, name: &str, spreadsheet_id: &str) -> Result<Option<String>, String> {
        let name = name.strip_prefix('@').unwrap_or(name).trim();
        if name.is_empty() {
            return Err("shortcut name is empty".to_string());
        }
        if name.contains(char::is_whitespace) {
            return Err(format!("shortcut name '{}' contains whitespace", name));
        }
        let spreadsheet_id = spreadsheet_id.trim();
        if spreadsheet_id.is_empty() {
            return Err(format!("no spreadsheet id given for '{}'", name));
        }
        Ok(self.entries.insert(name.to_string(), spreadsheet_id.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Shortcuts sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AliasResolver for Shortcuts {
    fn resolve_alias(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }
}
