//! One user's editing session against a remote store.

use crate::cache::CacheStore;
use crate::error::SyncError;
use crate::grid::CellGrid;
use crate::identity::{resolve_spreadsheet, AliasResolver, WorksheetIdentity};
use crate::ledger::{ChangeLedger, PendingChange};
use crate::overlay;
use crate::remote::{RemoteStore, SpreadsheetInfo};

/// Tunables the host passes in (usually from user settings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Width of the first row created in an empty grid
    pub default_width: usize,
    /// Re-address appended rows at flush time if the remote grew meanwhile
    pub rebase_appends: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            default_width: 5,
            rebase_appends: true,
        }
    }
}

/// Cache, ledger and remote store for one spreadsheet at a time.
///
/// Every operation takes `&mut self`: interaction is single-threaded, and a
/// flush always completes before the next mutation starts. A multithreaded
/// host must put the whole session behind one lock.
pub struct SheetSession<S: RemoteStore> {
    pub(crate) store: S,
    pub(crate) cache: CacheStore,
    pub(crate) ledger: ChangeLedger,
    pub(crate) spreadsheet: Option<SpreadsheetInfo>,
    /// Worksheet the remote side was last opened on
    pub(crate) bound: Option<WorksheetIdentity>,
    pub(crate) options: SessionOptions,
}

impl<S: RemoteStore> SheetSession<S> {
    pub fn new(store: S, options: SessionOptions) -> Self {
        Self {
            store,
            cache: CacheStore::new(),
            ledger: ChangeLedger::new(),
            spreadsheet: None,
            bound: None,
            options,
        }
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Resolve `key` (raw id, `@alias` or bare alias), open the spreadsheet
    /// and switch to its first worksheet.
    pub fn open(&mut self, key: &str, resolver: &dyn AliasResolver) -> Result<(), SyncError> {
        let spreadsheet_id = resolve_spreadsheet(key, resolver)?;
        let info = self
            .store
            .open_spreadsheet(&spreadsheet_id)
            .map_err(SyncError::from_read)?;
        log::info!("opened spreadsheet '{}' ({})", info.title, info.id);

        let first = info.worksheets.first().cloned().ok_or_else(|| {
            SyncError::NotFound(format!("spreadsheet '{}' has no worksheets", info.id))
        })?;
        self.spreadsheet = Some(info);
        self.switch_worksheet(&first)
    }

    pub fn spreadsheet(&self) -> Option<&SpreadsheetInfo> {
        self.spreadsheet.as_ref()
    }

    /// Worksheet titles of the open spreadsheet.
    pub fn worksheets(&self) -> &[String] {
        self.spreadsheet
            .as_ref()
            .map(|info| info.worksheets.as_slice())
            .unwrap_or(&[])
    }

    /// Make `name` the active worksheet, reading it fresh from the remote.
    ///
    /// Pending changes of every worksheet are kept; the new worksheet's own
    /// pending changes are replayed onto the fresh snapshot.
    pub fn switch_worksheet(&mut self, name: &str) -> Result<(), SyncError> {
        let info = self.spreadsheet.as_ref().ok_or(SyncError::NoSpreadsheet)?;
        if !info.worksheets.iter().any(|w| w == name) {
            return Err(SyncError::NotFound(format!(
                "worksheet '{}' in spreadsheet '{}'",
                name, info.id
            )));
        }
        let identity = WorksheetIdentity::new(info.id.clone(), name);

        self.cache.invalidate();
        self.reload(&identity)?;
        self.bound = Some(identity);
        log::info!("switched to worksheet '{}'", name);
        Ok(())
    }

    /// Re-read the active worksheet from the remote.
    pub fn refresh(&mut self) -> Result<(), SyncError> {
        let identity = self.cache.active().cloned().ok_or(SyncError::NoActiveWorksheet)?;
        self.reload(&identity)
    }

    /// The active worksheet's grid, pending edits included.
    pub fn grid(&self) -> &CellGrid {
        self.cache.active_grid()
    }

    pub fn active(&self) -> Option<&WorksheetIdentity> {
        self.cache.active()
    }

    pub fn pending(&self, identity: &WorksheetIdentity) -> &[PendingChange] {
        self.ledger.changes(identity)
    }

    /// Row inserts of `identity` the remote has not seen yet (0-based).
    pub fn pending_inserts(&self, identity: &WorksheetIdentity) -> &[usize] {
        self.ledger.inserted_rows(identity)
    }

    pub fn pending_total(&self) -> usize {
        self.ledger.total()
    }

    /// Worksheets with unflushed changes.
    pub fn dirty_worksheets(&self) -> Vec<WorksheetIdentity> {
        self.ledger.identities()
    }

    /// The cached grid of `identity` (empty if it is not cached) with its
    /// pending cell changes replayed. Leaves the cache untouched.
    pub fn project(&self, identity: &WorksheetIdentity) -> CellGrid {
        let empty = CellGrid::new();
        let base = if self.cache.is_active(identity) {
            self.cache.active_grid()
        } else {
            &empty
        };
        overlay::project(base, self.ledger.changes(identity), self.options.default_width)
    }

    /// Read `identity` and make it the cached grid, pending row inserts and
    /// edits on top.
    pub(crate) fn reload(&mut self, identity: &WorksheetIdentity) -> Result<(), SyncError> {
        let rows = self.store.read_all(identity).map_err(SyncError::from_read)?;
        log::debug!("read {} row(s) from {}", rows.len(), identity);

        self.cache.load(identity.clone(), rows);
        if self.ledger.is_empty_for(identity) {
            // Rows appended without values are gone with the old grid.
            self.ledger.clear(identity);
            return Ok(());
        }
        let grid = overlay::replay(
            self.cache.active_grid(),
            self.ledger.inserted_rows(identity),
            self.ledger.changes(identity),
            self.options.default_width,
        );
        self.cache.load_grid(identity.clone(), grid);
        Ok(())
    }
}
