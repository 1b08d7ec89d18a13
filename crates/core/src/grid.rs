//! Rectangular text grid holding one worksheet snapshot.

use serde::{Deserialize, Serialize};

/// Rows of text cells. Every row has the length of row 0.
///
/// Writes beyond the current bounds grow the grid: new rows are full width,
/// new columns are added to every row. Row 0 is the header row only by
/// convention of the display layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellGrid {
    rows: Vec<Vec<String>>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from ragged rows, padding each to the widest row.
    ///
    /// The remote store omits trailing blank cells, so rows rarely arrive
    /// with equal lengths.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count (length of row 0; 0 for an empty grid).
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Grow the grid so that `(row, col)` is addressable.
    ///
    /// An empty grid starts out `default_width` columns wide.
    pub fn ensure_cell(&mut self, row: usize, col: usize, default_width: usize) {
        let width = if self.rows.is_empty() { default_width } else { self.width() };
        while self.rows.len() <= row {
            self.rows.push(vec![String::new(); width]);
        }
        if col >= self.width() {
            self.widen(col + 1);
        }
    }

    /// Set one cell, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>, default_width: usize) {
        self.ensure_cell(row, col, default_width);
        self.rows[row][col] = value.into();
    }

    /// Insert an empty row at `position`; past the end it is appended.
    /// Returns the index the row ended up at.
    pub fn insert_row(&mut self, position: usize, default_width: usize) -> usize {
        let width = if self.rows.is_empty() { default_width } else { self.width() };
        let empty = vec![String::new(); width];
        if position >= self.rows.len() {
            self.rows.push(empty);
            self.rows.len() - 1
        } else {
            self.rows.insert(position, empty);
            position
        }
    }

    /// Append a row, padding it or widening the grid to keep it rectangular.
    /// Returns the index of the new row.
    pub fn push_row(&mut self, mut row: Vec<String>) -> usize {
        if !self.rows.is_empty() {
            let width = self.width();
            if row.len() > width {
                self.widen(row.len());
            } else {
                row.resize(width, String::new());
            }
        }
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// True when every row has the length of row 0.
    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.rows.iter().all(|r| r.len() == width)
    }

    fn widen(&mut self, width: usize) {
        for row in &mut self.rows {
            if row.len() < width {
                row.resize(width, String::new());
            }
        }
    }
}
