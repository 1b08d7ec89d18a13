use std::fmt;

use crate::remote::RemoteError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A mutation or flush was attempted with no worksheet open.
    NoActiveWorksheet,
    /// A worksheet operation was attempted with no spreadsheet open.
    NoSpreadsheet,
    /// Column numbers in an appended row are 1-based; 0 is not a column.
    InvalidColumn(usize),
    /// Reading cells or metadata from the remote store failed.
    RemoteReadFailure(String),
    /// The batch write (or direct append) was not accepted.
    RemoteWriteFailure(String),
    /// The remote store refused access.
    PermissionDenied(String),
    /// A spreadsheet, worksheet or alias could not be resolved.
    NotFound(String),
}

impl SyncError {
    /// Classify a failed read. Permission and not-found keep their own variants.
    pub fn from_read(err: RemoteError) -> Self {
        match err {
            RemoteError::PermissionDenied(msg) => Self::PermissionDenied(msg),
            RemoteError::NotFound(msg) => Self::NotFound(msg),
            RemoteError::Rejected(msg) | RemoteError::Transport(msg) => Self::RemoteReadFailure(msg),
        }
    }

    /// Classify a failed write.
    pub fn from_write(err: RemoteError) -> Self {
        match err {
            RemoteError::PermissionDenied(msg) => Self::PermissionDenied(msg),
            RemoteError::NotFound(msg) => Self::NotFound(msg),
            RemoteError::Rejected(msg) | RemoteError::Transport(msg) => Self::RemoteWriteFailure(msg),
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveWorksheet => write!(f, "no worksheet is currently open"),
            Self::NoSpreadsheet => write!(f, "no spreadsheet is currently open"),
            Self::InvalidColumn(col) => write!(f, "invalid column number {col} (columns start at 1)"),
            Self::RemoteReadFailure(msg) => write!(f, "failed to read from remote: {msg}"),
            Self::RemoteWriteFailure(msg) => write!(f, "failed to push changes: {msg}"),
            Self::PermissionDenied(msg) => write!(f, "permission denied: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
        }
    }
}

impl std::error::Error for SyncError {}
