//! Write surface: optimistic grid edits plus ledger entries.

use std::collections::BTreeMap;

use chrono::NaiveTime;

use crate::error::SyncError;
use crate::formula::time_formula;
use crate::ledger::PendingChange;
use crate::remote::RemoteStore;
use crate::session::SheetSession;

impl<S: RemoteStore> SheetSession<S> {
    /// Set one cell (0-based, header row included) and log the edit.
    ///
    /// The grid grows as needed and shows the value immediately, before any
    /// remote confirmation.
    pub fn update_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<(), SyncError> {
        let value = value.into();
        let default_width = self.options.default_width;
        let (identity, grid) = self.cache.active_mut().ok_or(SyncError::NoActiveWorksheet)?;

        grid.set(row, col, value.as_str(), default_width);
        log::debug!("{}: set ({}, {}) = {:?}", identity, row, col, value);
        self.ledger.record(identity, PendingChange::edit(row, col, value));
        Ok(())
    }

    /// Insert an empty row at `position` in the local grid.
    ///
    /// Pending changes at or below `position` move down with the rows they
    /// were made on. The insert itself is recorded and replayed on the
    /// remote at the next flush, ahead of the cell writes. A row inserted
    /// past the end counts as an appended row.
    pub fn insert_row(&mut self, position: usize) -> Result<usize, SyncError> {
        let default_width = self.options.default_width;
        let (identity, grid) = self.cache.active_mut().ok_or(SyncError::NoActiveWorksheet)?;

        let past_end = position >= grid.row_count();
        let at = grid.insert_row(position, default_width);
        if past_end {
            self.ledger.mark_appended(identity, at);
        } else {
            self.ledger.record_insert(identity, at);
        }
        log::debug!("{}: inserted empty row at {}", identity, at);
        Ok(at)
    }

    /// Append a row after every row in the local grid, including rows not
    /// yet flushed. `values` maps 1-based column numbers to text.
    ///
    /// Returns the 0-based index of the new row. Consecutive appends get
    /// consecutive rows.
    pub fn append_row(&mut self, values: &BTreeMap<usize, String>) -> Result<usize, SyncError> {
        check_columns(values)?;
        let default_width = self.options.default_width;
        let (identity, grid) = self.cache.active_mut().ok_or(SyncError::NoActiveWorksheet)?;

        let width = if grid.is_empty() { default_width } else { grid.width() };
        let next_row = grid.push_row(build_row(width, values));
        self.ledger.mark_appended(identity, next_row);
        for (col, value) in values {
            self.ledger.record(identity, PendingChange::append(next_row, col - 1, value.clone()));
        }
        log::debug!("{}: appended row {} ({} value(s))", identity, next_row, values.len());
        Ok(next_row)
    }

    /// Write `=TIME(h, m, 00)` at (row, col). A row at or past the end of
    /// the grid becomes a new appended row.
    pub fn insert_time(&mut self, row: usize, col: usize, time: NaiveTime) -> Result<(), SyncError> {
        if self.cache.active().is_none() {
            return Err(SyncError::NoActiveWorksheet);
        }
        let formula = time_formula(time);
        if row >= self.cache.active_grid().row_count() {
            let mut values = BTreeMap::new();
            values.insert(col + 1, formula);
            self.append_row(&values)?;
            Ok(())
        } else {
            self.update_cell(row, col, formula)
        }
    }

    /// Append a row straight to the remote store, bypassing the ledger,
    /// then re-read the worksheet.
    pub fn append_row_direct(&mut self, values: &BTreeMap<usize, String>) -> Result<(), SyncError> {
        check_columns(values)?;
        let identity = self.cache.active().cloned().ok_or(SyncError::NoActiveWorksheet)?;
        let grid = self.cache.active_grid();
        let width = if grid.is_empty() { self.options.default_width } else { grid.width() };
        let row = build_row(width, values);

        self.ensure_bound(&identity)?;
        self.store
            .append_remote_row(&identity, &row)
            .map_err(SyncError::from_write)?;
        log::info!("{}: appended row directly", identity);
        self.reload(&identity)
    }
}

fn check_columns(values: &BTreeMap<usize, String>) -> Result<(), SyncError> {
    if values.contains_key(&0) {
        return Err(SyncError::InvalidColumn(0));
    }
    Ok(())
}

/// Full-width row with the given 1-based columns filled in. Columns past
/// `width` widen the row.
fn build_row(width: usize, values: &BTreeMap<usize, String>) -> Vec<String> {
    let max_col = values.keys().next_back().copied().unwrap_or(0);
    let mut row = vec![String::new(); width.max(max_col)];
    for (col, value) in values {
        row[col - 1] = value.clone();
    }
    row
}
