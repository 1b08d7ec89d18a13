//! Read path: a grid with pending changes replayed on top.

use crate::grid::CellGrid;
use crate::ledger::PendingChange;

/// Copy `base` and replay `changes` in order, growing the copy the way
/// `update_cell` grows the live grid. `base` is never touched.
pub fn project(base: &CellGrid, changes: &[PendingChange], default_width: usize) -> CellGrid {
    let mut grid = base.clone();
    for change in changes {
        grid.set(change.row, change.col, change.value.as_str(), default_width);
    }
    grid
}

/// Rebuild a local view from a fresh remote snapshot: the pending row
/// inserts first, in order, then the cell changes.
pub fn replay(
    snapshot: &CellGrid,
    inserted_rows: &[usize],
    changes: &[PendingChange],
    default_width: usize,
) -> CellGrid {
    let mut grid = snapshot.clone();
    for &at in inserted_rows {
        grid.insert_row(at, default_width);
    }
    project(&grid, changes, default_width)
}
