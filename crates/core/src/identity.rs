//! Worksheet identity and alias resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Stable key of one worksheet: which spreadsheet, which tab.
///
/// Keys the change ledger and the cache binding. Never mutated after
/// construction; switching worksheets builds a new identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorksheetIdentity {
    spreadsheet_id: String,
    worksheet: String,
}

impl WorksheetIdentity {
    pub fn new(spreadsheet_id: impl Into<String>, worksheet: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }
}

impl fmt::Display for WorksheetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.spreadsheet_id, self.worksheet)
    }
}

/// Maps a user-facing alias to a raw spreadsheet identifier.
///
/// Persistence of aliases lives outside the core; the session only asks.
pub trait AliasResolver {
    fn resolve_alias(&self, name: &str) -> Option<String>;
}

/// Resolver with no aliases; every key is taken as a raw identifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAliases;

impl AliasResolver for NoAliases {
    fn resolve_alias(&self, _name: &str) -> Option<String> {
        None
    }
}

impl AliasResolver for std::collections::BTreeMap<String, String> {
    fn resolve_alias(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Resolve `key` to a spreadsheet identifier.
///
/// `@name` must name a known alias. A bare key is tried as an alias first
/// and otherwise used verbatim.
pub fn resolve_spreadsheet(key: &str, resolver: &dyn AliasResolver) -> Result<String, SyncError> {
    if let Some(name) = key.strip_prefix('@') {
        return resolver
            .resolve_alias(name)
            .ok_or_else(|| SyncError::NotFound(format!("unknown shortcut '@{name}'")));
    }
    Ok(resolver.resolve_alias(key).unwrap_or_else(|| key.to_string()))
}
