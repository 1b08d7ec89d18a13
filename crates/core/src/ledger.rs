//! Per-worksheet log of uncommitted cell edits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::WorksheetIdentity;

/// Which mutation produced a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOrigin {
    /// `update_cell` on an addressed cell
    Edit,
    /// A cell of a row created by `append_row`
    Append,
}

/// One pending cell write. Indices are 0-based and absolute (header included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChange {
    pub row: usize,
    pub col: usize,
    pub value: String,
    pub origin: ChangeOrigin,
}

impl PendingChange {
    pub fn edit(row: usize, col: usize, value: impl Into<String>) -> Self {
        Self { row, col, value: value.into(), origin: ChangeOrigin::Edit }
    }

    pub fn append(row: usize, col: usize, value: impl Into<String>) -> Self {
        Self { row, col, value: value.into(), origin: ChangeOrigin::Append }
    }
}

/// Pending state of one worksheet.
#[derive(Debug, Clone, Default)]
struct WorksheetLog {
    changes: Vec<PendingChange>,
    /// Row inserts the remote has not seen, in the order they were made
    inserted_rows: Vec<usize>,
    /// First row created locally past the remote's rows (by `append_row`
    /// or an insert past the end)
    appended_from: Option<usize>,
}

impl WorksheetLog {
    fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.inserted_rows.is_empty()
    }
}

/// Ordered pending changes keyed by worksheet.
///
/// Order within a worksheet is insertion order: replaying it front to back
/// lets a later write to the same cell win. Identities iterate in sorted
/// order so multi-worksheet flushes are deterministic.
///
/// Cell changes are kept in the coordinates of the local grid. Row inserts
/// are kept separately; applying them to the remote in order, before the
/// cell writes, makes the two coordinate systems agree.
#[derive(Debug, Clone, Default)]
pub struct ChangeLedger {
    entries: BTreeMap<WorksheetIdentity, WorksheetLog>,
}

impl ChangeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, identity: &WorksheetIdentity, change: PendingChange) {
        self.entries.entry(identity.clone()).or_default().changes.push(change);
    }

    /// Pending changes for `identity`, oldest first.
    pub fn changes(&self, identity: &WorksheetIdentity) -> &[PendingChange] {
        self.entries.get(identity).map(|log| log.changes.as_slice()).unwrap_or(&[])
    }

    /// Row inserts not yet applied to the remote, oldest first.
    pub fn inserted_rows(&self, identity: &WorksheetIdentity) -> &[usize] {
        self.entries.get(identity).map(|log| log.inserted_rows.as_slice()).unwrap_or(&[])
    }

    /// First locally appended row, if any row was appended.
    pub fn appended_from(&self, identity: &WorksheetIdentity) -> Option<usize> {
        self.entries.get(identity).and_then(|log| log.appended_from)
    }

    pub fn is_empty_for(&self, identity: &WorksheetIdentity) -> bool {
        self.entries.get(identity).map_or(true, WorksheetLog::is_empty)
    }

    /// Drop everything pending for `identity`; other worksheets are untouched.
    pub fn clear(&mut self, identity: &WorksheetIdentity) -> usize {
        self.entries
            .remove(identity)
            .map_or(0, |log| log.changes.len() + log.inserted_rows.len())
    }

    /// Worksheets that have at least one pending change.
    pub fn identities(&self) -> Vec<WorksheetIdentity> {
        self.entries
            .iter()
            .filter(|(_, log)| !log.is_empty())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Total number of pending cell changes and row inserts.
    pub fn total(&self) -> usize {
        self.entries
            .values()
            .map(|log| log.changes.len() + log.inserted_rows.len())
            .sum()
    }

    /// Note that row `row` was created locally after the remote's last row.
    pub(crate) fn mark_appended(&mut self, identity: &WorksheetIdentity, row: usize) {
        let log = self.entries.entry(identity.clone()).or_default();
        log.appended_from = Some(log.appended_from.map_or(row, |first| first.min(row)));
    }

    /// An empty row went in at `at`. Changes at or below it move down one
    /// row. Inserts among the appended rows stay local since those rows
    /// do not exist remotely yet.
    pub(crate) fn record_insert(&mut self, identity: &WorksheetIdentity, at: usize) {
        let log = self.entries.entry(identity.clone()).or_default();
        for change in log.changes.iter_mut().filter(|c| c.row >= at) {
            change.row += 1;
        }
        match log.appended_from {
            Some(first) if at >= first => {}
            Some(first) => {
                log.appended_from = Some(first + 1);
                log.inserted_rows.push(at);
            }
            None => log.inserted_rows.push(at),
        }
    }

    /// Forget inserts the remote has accepted; cell changes stay.
    pub(crate) fn clear_inserts(&mut self, identity: &WorksheetIdentity) {
        if let Some(log) = self.entries.get_mut(identity) {
            log.inserted_rows.clear();
        }
    }
}
