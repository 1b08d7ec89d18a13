// In-memory remote store shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use sheetsync_core::{
    letters_to_col, CellGrid, CellWrite, RemoteError, RemoteStore, SpreadsheetInfo, WorksheetIdentity,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(String),
    Read(String),
    BatchWrite(String, Vec<(String, String)>),
    Append(String, Vec<String>),
    Insert(String, Vec<usize>),
}

#[derive(Default)]
pub struct MemoryStore {
    titles: RefCell<BTreeMap<String, String>>,
    // spreadsheet id -> worksheets in tab order
    sheets: RefCell<BTreeMap<String, Vec<(String, CellGrid)>>>,
    calls: RefCell<Vec<Call>>,
    next_write_error: RefCell<Option<RemoteError>>,
    next_read_error: RefCell<Option<RemoteError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worksheet(self, spreadsheet: &str, worksheet: &str, rows: &[&[&str]]) -> Self {
        let grid = CellGrid::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        self.titles
            .borrow_mut()
            .entry(spreadsheet.to_string())
            .or_insert_with(|| format!("Title of {spreadsheet}"));
        self.sheets
            .borrow_mut()
            .entry(spreadsheet.to_string())
            .or_default()
            .push((worksheet.to_string(), grid));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn batch_writes(&self) -> Vec<Vec<(String, String)>> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::BatchWrite(_, writes) => Some(writes.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn fail_next_write(&self, err: RemoteError) {
        *self.next_write_error.borrow_mut() = Some(err);
    }

    pub fn fail_next_read(&self, err: RemoteError) {
        *self.next_read_error.borrow_mut() = Some(err);
    }

    pub fn rows(&self, spreadsheet: &str, worksheet: &str) -> Vec<Vec<String>> {
        self.with_grid(spreadsheet, worksheet, |g| g.rows().to_vec())
            .unwrap_or_default()
    }

    /// Another client appends a row behind our back.
    pub fn push_foreign_row(&self, spreadsheet: &str, worksheet: &str, row: &[&str]) {
        self.with_grid(spreadsheet, worksheet, |g| {
            g.push_row(row.iter().map(|s| s.to_string()).collect());
        });
    }

    fn with_grid<T>(&self, spreadsheet: &str, worksheet: &str, f: impl FnOnce(&mut CellGrid) -> T) -> Option<T> {
        let mut sheets = self.sheets.borrow_mut();
        let tabs = sheets.get_mut(spreadsheet)?;
        let (_, grid) = tabs.iter_mut().find(|(name, _)| name == worksheet)?;
        Some(f(grid))
    }

    fn key(identity: &WorksheetIdentity) -> String {
        identity.to_string()
    }
}

impl RemoteStore for MemoryStore {
    fn open_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, RemoteError> {
        self.calls.borrow_mut().push(Call::Open(spreadsheet_id.to_string()));
        let sheets = self.sheets.borrow();
        let tabs = sheets
            .get(spreadsheet_id)
            .ok_or_else(|| RemoteError::NotFound(format!("spreadsheet '{spreadsheet_id}'")))?;
        Ok(SpreadsheetInfo {
            id: spreadsheet_id.to_string(),
            title: self.titles.borrow().get(spreadsheet_id).cloned().unwrap_or_default(),
            worksheets: tabs.iter().map(|(name, _)| name.clone()).collect(),
        })
    }

    fn read_all(&self, identity: &WorksheetIdentity) -> Result<Vec<Vec<String>>, RemoteError> {
        self.calls.borrow_mut().push(Call::Read(Self::key(identity)));
        if let Some(err) = self.next_read_error.borrow_mut().take() {
            return Err(err);
        }
        // Trailing blank cells are not returned, like the real store.
        self.with_grid(identity.spreadsheet_id(), identity.worksheet(), |g| {
            g.rows()
                .iter()
                .map(|row| {
                    let keep = row.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
                    row[..keep].to_vec()
                })
                .collect()
        })
        .ok_or_else(|| RemoteError::NotFound(identity.to_string()))
    }

    fn batch_write(&self, identity: &WorksheetIdentity, writes: &[CellWrite]) -> Result<(), RemoteError> {
        self.calls.borrow_mut().push(Call::BatchWrite(
            Self::key(identity),
            writes.iter().map(|w| (w.address.to_string(), w.value.clone())).collect(),
        ));
        if let Some(err) = self.next_write_error.borrow_mut().take() {
            return Err(err);
        }
        self.with_grid(identity.spreadsheet_id(), identity.worksheet(), |g| {
            for w in writes {
                let col = letters_to_col(&w.address.column).expect("valid column label");
                g.set(w.address.row - 1, col, w.value.as_str(), 1);
            }
        })
        .ok_or_else(|| RemoteError::NotFound(identity.to_string()))
    }

    fn append_remote_row(&self, identity: &WorksheetIdentity, row: &[String]) -> Result<(), RemoteError> {
        self.calls.borrow_mut().push(Call::Append(Self::key(identity), row.to_vec()));
        if let Some(err) = self.next_write_error.borrow_mut().take() {
            return Err(err);
        }
        self.with_grid(identity.spreadsheet_id(), identity.worksheet(), |g| {
            g.push_row(row.to_vec());
        })
        .ok_or_else(|| RemoteError::NotFound(identity.to_string()))
    }

    fn insert_rows(&self, identity: &WorksheetIdentity, positions: &[usize]) -> Result<(), RemoteError> {
        self.calls.borrow_mut().push(Call::Insert(Self::key(identity), positions.to_vec()));
        if let Some(err) = self.next_write_error.borrow_mut().take() {
            return Err(err);
        }
        self.with_grid(identity.spreadsheet_id(), identity.worksheet(), |g| {
            for &at in positions {
                // Past the data the sheet already has blank rows to shift.
                while g.row_count() < at {
                    g.push_row(Vec::new());
                }
                g.insert_row(at, 1);
            }
        })
        .ok_or_else(|| RemoteError::NotFound(identity.to_string()))
    }
}

pub fn rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}
