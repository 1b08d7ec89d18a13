//! `sheetsync-core`: local write-back cache for remote worksheets.
//!
//! Holds a snapshot of one worksheet's cells, applies edits to it
//! optimistically, logs every edit in a per-worksheet ledger and reconciles
//! that ledger against the remote store on explicit flush points.
//!
//! No HTTP, no files, no terminal. The remote store and the alias lookup
//! are injected through [`RemoteStore`] and [`AliasResolver`].

pub mod address;
pub mod cache;
pub mod error;
pub mod formula;
pub mod grid;
pub mod identity;
pub mod ledger;
pub mod overlay;
pub mod remote;
pub mod session;

mod mutate;
mod reconcile;

pub use address::{col_to_letters, letters_to_col, parse_a1, CellAddress};
pub use cache::CacheStore;
pub use error::SyncError;
pub use grid::CellGrid;
pub use identity::{AliasResolver, NoAliases, WorksheetIdentity};
pub use ledger::{ChangeLedger, ChangeOrigin, PendingChange};
pub use remote::{CellWrite, RemoteError, RemoteStore, SpreadsheetInfo};
pub use session::{SessionOptions, SheetSession};
