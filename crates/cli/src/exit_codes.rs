//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | Success                                           |
//! | 1    | General error (unspecified)                       |
//! | 2    | Usage error (bad args, bad edit script)           |
//! | 3    | Spreadsheet, worksheet or shortcut not found      |
//! | 4    | Permission denied by the remote                   |
//! | 5    | Remote read or write failed                       |
//! | 50   | No access token (neither flag nor env var)        |

use sheetsync_core::SyncError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unparsable edit script, column 0.
pub const EXIT_USAGE: u8 = 2;

/// Spreadsheet id, worksheet title or shortcut could not be resolved.
pub const EXIT_NOT_FOUND: u8 = 3;

/// The remote refused access (401/403, PERMISSION_DENIED).
pub const EXIT_PERMISSION: u8 = 4;

/// Network failure or rejected request while reading or flushing.
pub const EXIT_REMOTE: u8 = 5;

/// No access token provided (neither --token nor SHEETSYNC_TOKEN).
pub const EXIT_NOT_AUTH: u8 = 50;

/// Map a SyncError to its exit code.
pub fn sync_exit_code(err: &SyncError) -> u8 {
    match err {
        SyncError::NotFound(_) => EXIT_NOT_FOUND,
        SyncError::PermissionDenied(_) => EXIT_PERMISSION,
        SyncError::RemoteReadFailure(_) | SyncError::RemoteWriteFailure(_) => EXIT_REMOTE,
        SyncError::InvalidColumn(_) => EXIT_USAGE,
        SyncError::NoActiveWorksheet | SyncError::NoSpreadsheet => EXIT_ERROR,
    }
}
