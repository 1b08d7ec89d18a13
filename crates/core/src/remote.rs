//! The remote tabular store, as seen by the cache.

use std::fmt;

use crate::address::CellAddress;
use crate::identity::WorksheetIdentity;

/// Spreadsheet metadata returned when a spreadsheet is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetInfo {
    /// Identifier to use for every later call (may differ from the one
    /// passed to `open_spreadsheet`, e.g. after a format conversion)
    pub id: String,
    pub title: String,
    /// Worksheet titles in tab order
    pub worksheets: Vec<String>,
}

/// One cell of a batch write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub address: CellAddress,
    pub value: String,
}

/// Failure reported by a remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Credentials lack access to the spreadsheet
    PermissionDenied(String),
    /// Spreadsheet or worksheet does not exist
    NotFound(String),
    /// The store refused the request (bad range, bad value)
    Rejected(String),
    /// Network or protocol failure
    Transport(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied(msg) => write!(f, "permission denied: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Rejected(msg) => write!(f, "rejected: {msg}"),
            Self::Transport(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Blocking access to a remote tabular store.
///
/// Values written through `batch_write` and `append_remote_row` are
/// interpreted as if typed by a user: a leading `=` makes a formula.
pub trait RemoteStore {
    /// Look up a spreadsheet and list its worksheets.
    fn open_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, RemoteError>;

    /// Full snapshot of one worksheet; rows may be ragged.
    fn read_all(&self, identity: &WorksheetIdentity) -> Result<Vec<Vec<String>>, RemoteError>;

    /// Write many cells in one request. Fails as a unit.
    fn batch_write(&self, identity: &WorksheetIdentity, writes: &[CellWrite]) -> Result<(), RemoteError>;

    /// Append one row after the last row holding data.
    fn append_remote_row(&self, identity: &WorksheetIdentity, row: &[String]) -> Result<(), RemoteError>;

    /// Insert empty rows in one request. Each entry is a 0-based row index,
    /// applied in order, with later entries seeing the earlier inserts.
    fn insert_rows(&self, identity: &WorksheetIdentity, positions: &[usize]) -> Result<(), RemoteError>;
}

impl<S: RemoteStore + ?Sized> RemoteStore for &S {
    fn open_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, RemoteError> {
        (**self).open_spreadsheet(spreadsheet_id)
    }

    fn read_all(&self, identity: &WorksheetIdentity) -> Result<Vec<Vec<String>>, RemoteError> {
        (**self).read_all(identity)
    }

    fn batch_write(&self, identity: &WorksheetIdentity, writes: &[CellWrite]) -> Result<(), RemoteError> {
        (**self).batch_write(identity, writes)
    }

    fn append_remote_row(&self, identity: &WorksheetIdentity, row: &[String]) -> Result<(), RemoteError> {
        (**self).append_remote_row(identity, row)
    }

    fn insert_rows(&self, identity: &WorksheetIdentity, positions: &[usize]) -> Result<(), RemoteError> {
        (**self).insert_rows(identity, positions)
    }
}
