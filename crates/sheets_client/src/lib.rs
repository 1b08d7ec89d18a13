//! Google Sheets client for sheetsync.
//!
//! Implements the core's `RemoteStore` over the Sheets v4 REST API, plus the
//! Drive v3 copy call used to open uploaded Office files.
//!
//! Blocking, no retries. The caller hands in an OAuth bearer token; obtaining
//! and refreshing it is not this crate's job.

mod client;
mod error;

pub use client::{is_office_file_id, SheetsClient, DEFAULT_DRIVE_BASE, DEFAULT_SHEETS_BASE};
pub use error::SheetsError;
