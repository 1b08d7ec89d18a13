//! Flushing pending changes to the remote store.

use crate::address::CellAddress;
use crate::error::SyncError;
use crate::identity::WorksheetIdentity;
use crate::ledger::PendingChange;
use crate::remote::{CellWrite, RemoteStore};
use crate::session::SheetSession;

impl<S: RemoteStore> SheetSession<S> {
    /// Push every pending change of `identity`: pending row inserts in one
    /// request, then every cell in one batch write.
    ///
    /// Returns the number of cells written; an empty ledger returns `Ok(0)`
    /// without touching the remote. On success the ledger for `identity` is
    /// cleared and, if it is the active worksheet, the cache is replaced by
    /// a fresh read. If that read fails the changes are already committed:
    /// the error is a `RemoteReadFailure` and the ledger stays empty.
    ///
    /// A failed write leaves the cell changes and the cache as they were so
    /// the flush can be retried. Row inserts the remote accepted are dropped
    /// from the ledger even when the cell write after them fails.
    pub fn flush(&mut self, identity: &WorksheetIdentity) -> Result<usize, SyncError> {
        if self.ledger.is_empty_for(identity) {
            log::debug!("{}: nothing to flush", identity);
            return Ok(0);
        }

        self.ensure_bound(identity)?;
        let append_shift = if self.options.rebase_appends {
            self.append_shift(identity)?
        } else {
            0
        };

        let inserted = self.ledger.inserted_rows(identity).to_vec();
        if !inserted.is_empty() {
            log::info!("{}: inserting {} row(s)", identity, inserted.len());
            if let Err(e) = self.store.insert_rows(identity, &inserted) {
                log::warn!("{}: row insert failed, nothing pushed: {}", identity, e);
                return Err(SyncError::from_write(e));
            }
            self.ledger.clear_inserts(identity);
        }

        let writes = translate(
            self.ledger.changes(identity),
            self.ledger.appended_from(identity),
            append_shift,
        );
        if !writes.is_empty() {
            log::info!("{}: flushing {} change(s)", identity, writes.len());
            if let Err(e) = self.store.batch_write(identity, &writes) {
                log::warn!("{}: flush failed, keeping {} pending change(s): {}", identity, writes.len(), e);
                return Err(SyncError::from_write(e));
            }
        }

        self.ledger.clear(identity);
        if self.cache.is_active(identity) {
            self.reload(identity)?;
        }
        Ok(writes.len())
    }

    /// Flush the active worksheet.
    pub fn flush_active(&mut self) -> Result<usize, SyncError> {
        let identity = self.cache.active().cloned().ok_or(SyncError::NoActiveWorksheet)?;
        self.flush(&identity)
    }

    /// Flush every worksheet with pending changes, one batch per worksheet.
    ///
    /// Stops at the first failure; worksheets flushed before it stay flushed.
    pub fn flush_all(&mut self) -> Result<usize, SyncError> {
        let mut total = 0;
        for identity in self.ledger.identities() {
            total += self.flush(&identity)?;
        }
        Ok(total)
    }

    /// Point the remote side at `identity`'s spreadsheet before writing to it.
    pub(crate) fn ensure_bound(&mut self, identity: &WorksheetIdentity) -> Result<(), SyncError> {
        if self.bound.as_ref() == Some(identity) {
            return Ok(());
        }
        log::info!("re-binding remote session to {}", identity);
        let info = self
            .store
            .open_spreadsheet(identity.spreadsheet_id())
            .map_err(SyncError::from_read)?;
        if !info.worksheets.iter().any(|w| w == identity.worksheet()) {
            return Err(SyncError::NotFound(format!(
                "worksheet '{}' in spreadsheet '{}'",
                identity.worksheet(),
                identity.spreadsheet_id()
            )));
        }
        self.bound = Some(identity.clone());
        Ok(())
    }

    /// Rows to move locally appended rows down by so they land after the
    /// remote's current last row. Zero when nothing was appended or nothing
    /// overlaps.
    fn append_shift(&self, identity: &WorksheetIdentity) -> Result<usize, SyncError> {
        let Some(first) = self.ledger.appended_from(identity) else {
            return Ok(0);
        };
        let remote_rows = self
            .store
            .read_all(identity)
            .map_err(SyncError::from_read)?
            .len();
        // Our own pending inserts land above the appended rows first.
        let rows_after_inserts = remote_rows + self.ledger.inserted_rows(identity).len();
        let shift = rows_after_inserts.saturating_sub(first);
        if shift > 0 {
            log::warn!(
                "{}: remote now has {} row(s); moving appended rows down by {}",
                identity, remote_rows, shift
            );
        }
        Ok(shift)
    }
}

/// Ledger entries to remote writes, in ledger order. Every change on a row
/// at or after `appended_from` moves down by `append_shift`, whichever
/// mutation produced it.
pub(crate) fn translate(
    changes: &[PendingChange],
    appended_from: Option<usize>,
    append_shift: usize,
) -> Vec<CellWrite> {
    changes
        .iter()
        .map(|change| {
            let row = match appended_from {
                Some(first) if change.row >= first => change.row + append_shift,
                _ => change.row,
            };
            CellWrite {
                address: CellAddress::from_grid(row, change.col),
                value: change.value.clone(),
            }
        })
        .collect()
}
