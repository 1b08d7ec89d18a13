//! Snapshot of the active worksheet.

use crate::grid::CellGrid;
use crate::identity::WorksheetIdentity;

/// Owns the grid of the worksheet currently being viewed.
///
/// Loaded by a full remote read on open/switch, cleared on switch, and
/// overwritten by the re-read that follows a successful flush.
#[derive(Debug, Default)]
pub struct CacheStore {
    active: Option<WorksheetIdentity>,
    grid: CellGrid,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the grid with `rows` and make `identity` active.
    pub fn load(&mut self, identity: WorksheetIdentity, rows: Vec<Vec<String>>) {
        self.grid = CellGrid::from_rows(rows);
        self.active = Some(identity);
    }

    /// The active grid; empty when nothing is active.
    pub fn active_grid(&self) -> &CellGrid {
        &self.grid
    }

    pub fn active(&self) -> Option<&WorksheetIdentity> {
        self.active.as_ref()
    }

    pub fn is_active(&self, identity: &WorksheetIdentity) -> bool {
        self.active.as_ref() == Some(identity)
    }

    /// Drop the cached grid and the active binding.
    pub fn invalidate(&mut self) {
        self.grid = CellGrid::new();
        self.active = None;
    }

    /// Install an already-built grid for `identity` and make it active.
    pub(crate) fn load_grid(&mut self, identity: WorksheetIdentity, grid: CellGrid) {
        self.grid = grid;
        self.active = Some(identity);
    }

    /// The active identity and its grid, for optimistic writes.
    pub(crate) fn active_mut(&mut self) -> Option<(&WorksheetIdentity, &mut CellGrid)> {
        let identity = self.active.as_ref()?;
        Some((identity, &mut self.grid))
    }
}
