// Integration tests: SheetSession against an in-memory remote store.
// Run with: cargo test -p sheetsync-core --test session

mod common;

use std::collections::BTreeMap;

use chrono::NaiveTime;
use common::{rows, Call, MemoryStore};
use sheetsync_core::{
    ChangeOrigin, NoAliases, PendingChange, RemoteError, SessionOptions, SheetSession, SyncError,
    WorksheetIdentity,
};

fn timesheet() -> MemoryStore {
    MemoryStore::new()
        .with_worksheet("s1", "Hours", &[&["Date", "Hrs"], &["2024-01-01", "8"]])
        .with_worksheet("s1", "Notes", &[&["Topic"], &["standup"]])
}

fn open(store: &MemoryStore) -> SheetSession<&MemoryStore> {
    let mut session = SheetSession::new(store, SessionOptions::default());
    session.open("s1", &NoAliases).unwrap();
    store.clear_calls();
    session
}

fn hours() -> WorksheetIdentity {
    WorksheetIdentity::new("s1", "Hours")
}

fn notes() -> WorksheetIdentity {
    WorksheetIdentity::new("s1", "Notes")
}

fn cols(pairs: &[(usize, &str)]) -> BTreeMap<usize, String> {
    pairs.iter().map(|(c, v)| (*c, v.to_string())).collect()
}

// ── Open / switch ───────────────────────────────────────────────────

#[test]
fn open_loads_first_worksheet() {
    let store = timesheet();
    let session = open(&store);
    assert_eq!(session.active(), Some(&hours()));
    assert_eq!(session.worksheets(), &["Hours".to_string(), "Notes".to_string()]);
    assert_eq!(session.grid().rows(), rows(&[&["Date", "Hrs"], &["2024-01-01", "8"]]).as_slice());
}

#[test]
fn open_through_alias() {
    let store = timesheet();
    let mut aliases = BTreeMap::new();
    aliases.insert("ts".to_string(), "s1".to_string());

    let mut session = SheetSession::new(&store, SessionOptions::default());
    session.open("@ts", &aliases).unwrap();
    assert_eq!(session.spreadsheet().map(|s| s.id.as_str()), Some("s1"));
}

#[test]
fn unknown_alias_never_reaches_remote() {
    let store = timesheet();
    let mut session = SheetSession::new(&store, SessionOptions::default());
    let err = session.open("@missing", &NoAliases).unwrap_err();
    assert!(matches!(err, SyncError::NotFound(_)));
    assert!(store.calls().is_empty());
}

#[test]
fn unknown_spreadsheet_is_not_found() {
    let store = timesheet();
    let mut session = SheetSession::new(&store, SessionOptions::default());
    let err = session.open("nope", &NoAliases).unwrap_err();
    assert!(matches!(err, SyncError::NotFound(_)));
    assert!(session.active().is_none());
}

#[test]
fn switch_requires_open_spreadsheet_and_known_worksheet() {
    let store = timesheet();
    let mut session = SheetSession::new(&store, SessionOptions::default());
    assert_eq!(session.switch_worksheet("Hours"), Err(SyncError::NoSpreadsheet));

    let mut session = open(&store);
    let err = session.switch_worksheet("Expenses").unwrap_err();
    assert!(matches!(err, SyncError::NotFound(_)));
}

#[test]
fn switching_keeps_pending_edits_and_replays_them() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();

    session.switch_worksheet("Notes").unwrap();
    assert_eq!(session.grid().get(1, 0), Some("standup"));
    assert_eq!(session.pending(&hours()).len(), 1);

    session.switch_worksheet("Hours").unwrap();
    assert_eq!(session.grid().get(1, 1), Some("9"));
    assert_eq!(store.rows("s1", "Hours")[1][1], "8");
}

// ── Mutation API ────────────────────────────────────────────────────

#[test]
fn mutations_require_active_worksheet() {
    let store = timesheet();
    let mut session = SheetSession::new(&store, SessionOptions::default());
    assert_eq!(session.update_cell(0, 0, "x"), Err(SyncError::NoActiveWorksheet));
    assert_eq!(session.append_row(&cols(&[(1, "x")])), Err(SyncError::NoActiveWorksheet));
    assert_eq!(session.insert_row(0), Err(SyncError::NoActiveWorksheet));
    assert_eq!(session.flush_active(), Err(SyncError::NoActiveWorksheet));
    let t = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
    assert_eq!(session.insert_time(0, 0, t), Err(SyncError::NoActiveWorksheet));
}

#[test]
fn update_is_visible_before_flush() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();
    assert_eq!(session.grid().get(1, 1), Some("9"));
    assert!(store.calls().is_empty());
}

#[test]
fn append_fills_named_columns_only() {
    let store = timesheet();
    let mut session = open(&store);

    let row = session.append_row(&cols(&[(2, "5")])).unwrap();
    assert_eq!(row, 2);
    assert_eq!(session.grid().row(2), Some(&["".to_string(), "5".to_string()][..]));
    assert_eq!(session.pending(&hours()), &[PendingChange::append(2, 1, "5")]);
}

#[test]
fn appends_are_contiguous() {
    let store = timesheet();
    let mut session = open(&store);
    let mut rows = Vec::new();
    for i in 0..4 {
        let day = format!("day {i}");
        rows.push(session.append_row(&cols(&[(1, day.as_str())])).unwrap());
    }
    assert_eq!(rows, vec![2, 3, 4, 5]);
}

#[test]
fn append_rejects_column_zero() {
    let store = timesheet();
    let mut session = open(&store);
    assert_eq!(session.append_row(&cols(&[(0, "x")])), Err(SyncError::InvalidColumn(0)));
    assert_eq!(session.pending_total(), 0);
}

#[test]
fn insert_row_moves_pending_edits_with_their_rows() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 0, "2024-01-02").unwrap();

    assert_eq!(session.insert_row(1).unwrap(), 1);
    assert_eq!(session.grid().get(2, 0), Some("2024-01-02"));
    assert_eq!(session.pending(&hours())[0].row, 2);
    assert_eq!(session.pending_total(), 2);
    assert_eq!(session.project(&hours()), *session.grid());
    assert!(store.calls().is_empty());
}

#[test]
fn insert_past_end_is_an_appended_row() {
    let store = timesheet();
    let mut session = open(&store);
    assert_eq!(session.insert_row(9).unwrap(), 2);
    session.update_cell(2, 0, "mine").unwrap();
    store.push_foreign_row("s1", "Hours", &["theirs", "1"]);

    session.flush_active().unwrap();
    assert!(!store.calls().iter().any(|c| matches!(c, Call::Insert(..))));
    let remote = store.rows("s1", "Hours");
    assert_eq!(remote[2][0], "theirs");
    assert_eq!(remote[3][0], "mine");
}

#[test]
fn insert_time_updates_existing_row() {
    let store = timesheet();
    let mut session = open(&store);
    let t = NaiveTime::from_hms_opt(14, 30, 0).unwrap();

    session.insert_time(1, 1, t).unwrap();
    assert_eq!(session.grid().get(1, 1), Some("=TIME(14, 30, 00)"));
    assert_eq!(session.pending(&hours())[0].origin, ChangeOrigin::Edit);
}

#[test]
fn insert_time_past_end_appends() {
    let store = timesheet();
    let mut session = open(&store);
    let t = NaiveTime::from_hms_opt(7, 5, 0).unwrap();

    session.insert_time(9, 1, t).unwrap();
    assert_eq!(session.grid().row_count(), 3);
    assert_eq!(session.grid().get(2, 1), Some("=TIME(7, 5, 00)"));
    assert_eq!(session.pending(&hours())[0].origin, ChangeOrigin::Append);
}

// ── Reconciler ──────────────────────────────────────────────────────

#[test]
fn flush_sends_one_batch_and_clears_ledger() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();

    assert_eq!(session.flush(&hours()).unwrap(), 1);
    assert_eq!(store.batch_writes(), vec![vec![("B2".to_string(), "9".to_string())]]);
    assert!(session.pending(&hours()).is_empty());
    assert_eq!(store.rows("s1", "Hours")[1][1], "9");
    assert_eq!(session.grid().get(1, 1), Some("9"));
}

#[test]
fn flush_with_empty_ledger_does_not_touch_remote() {
    let store = timesheet();
    let mut session = open(&store);
    assert_eq!(session.flush(&hours()), Ok(0));
    assert_eq!(session.flush_all(), Ok(0));
    assert!(store.calls().is_empty());
}

#[test]
fn later_edits_to_same_cell_win_remotely() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "7").unwrap();
    session.update_cell(1, 1, "10").unwrap();
    session.flush_active().unwrap();
    assert_eq!(store.rows("s1", "Hours")[1][1], "10");
}

#[test]
fn failed_flush_keeps_ledger_and_grid() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();
    store.fail_next_write(RemoteError::Rejected("Invalid value at 'data[0]'".into()));

    let err = session.flush(&hours()).unwrap_err();
    assert_eq!(err, SyncError::RemoteWriteFailure("Invalid value at 'data[0]'".into()));
    assert_eq!(session.pending(&hours()), &[PendingChange::edit(1, 1, "9")]);
    assert_eq!(session.grid().get(1, 1), Some("9"));
    assert_eq!(store.rows("s1", "Hours")[1][1], "8");

    // Retry goes through.
    assert_eq!(session.flush(&hours()), Ok(1));
    assert_eq!(store.rows("s1", "Hours")[1][1], "9");
}

#[test]
fn permission_denied_is_distinguished() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();
    store.fail_next_write(RemoteError::PermissionDenied("read-only".into()));

    assert_eq!(session.flush_active(), Err(SyncError::PermissionDenied("read-only".into())));
    assert_eq!(session.pending_total(), 1);
}

#[test]
fn ledgers_are_isolated_per_worksheet() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();
    session.switch_worksheet("Notes").unwrap();
    session.update_cell(1, 0, "retro").unwrap();

    assert_eq!(session.pending(&hours()), &[PendingChange::edit(1, 1, "9")]);
    assert_eq!(session.pending(&notes()), &[PendingChange::edit(1, 0, "retro")]);
    assert_eq!(session.dirty_worksheets(), vec![hours(), notes()]);
}

#[test]
fn flush_all_sends_one_batch_per_worksheet() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();
    session.switch_worksheet("Notes").unwrap();
    session.update_cell(1, 0, "retro").unwrap();
    store.clear_calls();

    assert_eq!(session.flush_all(), Ok(2));
    assert_eq!(store.batch_writes().len(), 2);
    assert_eq!(session.pending_total(), 0);
    assert_eq!(store.rows("s1", "Hours")[1][1], "9");
    assert_eq!(store.rows("s1", "Notes")[1][0], "retro");
}

#[test]
fn flushing_another_worksheet_rebinds_first() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();
    session.switch_worksheet("Notes").unwrap();
    store.clear_calls();

    session.flush(&hours()).unwrap();
    assert_eq!(
        store.calls(),
        vec![
            Call::Open("s1".into()),
            Call::BatchWrite("s1:Hours".into(), vec![("B2".into(), "9".into())]),
        ]
    );
    // Notes stays active and is not re-read.
    assert_eq!(session.active(), Some(&notes()));
}

#[test]
fn appended_rows_move_past_foreign_rows() {
    let store = timesheet();
    let mut session = open(&store);
    session.append_row(&cols(&[(1, "2024-01-02"), (2, "7")])).unwrap();
    store.push_foreign_row("s1", "Hours", &["2024-01-05", "3"]);

    session.flush_active().unwrap();
    let remote = store.rows("s1", "Hours");
    assert_eq!(remote.len(), 4);
    assert_eq!(remote[2], vec!["2024-01-05".to_string(), "3".to_string()]);
    assert_eq!(remote[3], vec!["2024-01-02".to_string(), "7".to_string()]);
    assert_eq!(session.grid().row_count(), 4);
}

#[test]
fn edits_on_appended_rows_move_with_them() {
    let store = timesheet();
    let mut session = open(&store);
    let row = session.append_row(&cols(&[(1, "2024-01-02")])).unwrap();
    session.update_cell(row, 1, "7").unwrap();
    store.push_foreign_row("s1", "Hours", &["theirs", "1"]);

    session.flush_active().unwrap();
    assert_eq!(
        store.batch_writes(),
        vec![vec![("A4".to_string(), "2024-01-02".to_string()), ("B4".to_string(), "7".to_string())]]
    );
    let remote = store.rows("s1", "Hours");
    assert_eq!(remote[2], vec!["theirs".to_string(), "1".to_string()]);
    assert_eq!(remote[3], vec!["2024-01-02".to_string(), "7".to_string()]);
}

#[test]
fn rebase_can_be_disabled() {
    let store = timesheet();
    let options = SessionOptions { rebase_appends: false, ..SessionOptions::default() };
    let mut session = SheetSession::new(&store, options);
    session.open("s1", &NoAliases).unwrap();
    session.append_row(&cols(&[(1, "mine")])).unwrap();
    store.push_foreign_row("s1", "Hours", &["theirs", "1"]);

    session.flush_active().unwrap();
    assert_eq!(store.rows("s1", "Hours")[2][0], "mine");
}

#[test]
fn inserted_row_reaches_remote_before_cell_writes() {
    let store = MemoryStore::new().with_worksheet("s1", "Hours", &[&["Date", "Hrs"], &["d1", "8"], &["d2", "7"]]);
    let mut session = open(&store);
    session.update_cell(2, 1, "9").unwrap();
    session.insert_row(1).unwrap();
    session.update_cell(1, 0, "d0").unwrap();

    assert_eq!(session.flush_active(), Ok(2));
    assert_eq!(
        store.calls()[..3],
        [
            Call::Insert("s1:Hours".into(), vec![1]),
            Call::BatchWrite("s1:Hours".into(), vec![("B4".into(), "9".into()), ("A2".into(), "d0".into())]),
            Call::Read("s1:Hours".into()),
        ]
    );
    assert_eq!(
        store.rows("s1", "Hours"),
        rows(&[&["Date", "Hrs"], &["d0", ""], &["d1", "8"], &["d2", "9"]])
    );
    assert_eq!(session.pending_total(), 0);
    assert_eq!(session.grid().get(3, 1), Some("9"));
}

#[test]
fn switching_back_replays_inserted_rows() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();
    session.insert_row(1).unwrap();
    let before = session.grid().clone();

    session.switch_worksheet("Notes").unwrap();
    session.switch_worksheet("Hours").unwrap();
    assert_eq!(*session.grid(), before);
    assert_eq!(session.grid().get(2, 1), Some("9"));
}

#[test]
fn failed_insert_pushes_nothing() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();
    session.insert_row(1).unwrap();
    store.fail_next_write(RemoteError::Transport("connection reset".into()));

    let err = session.flush_active().unwrap_err();
    assert_eq!(err, SyncError::RemoteWriteFailure("connection reset".into()));
    assert!(store.batch_writes().is_empty());
    assert_eq!(session.pending_total(), 2);

    assert_eq!(session.flush_active(), Ok(1));
    assert_eq!(store.rows("s1", "Hours"), rows(&[&["Date", "Hrs"], &["", ""], &["2024-01-01", "9"]]));
}

#[test]
fn reread_failure_after_accepted_write_still_clears_ledger() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();
    store.fail_next_read(RemoteError::Transport("timed out".into()));

    assert_eq!(session.flush_active(), Err(SyncError::RemoteReadFailure("timed out".into())));
    assert_eq!(session.pending_total(), 0);
    assert_eq!(store.rows("s1", "Hours")[1][1], "9");
}

#[test]
fn direct_append_skips_ledger() {
    let store = timesheet();
    let mut session = open(&store);
    session.append_row_direct(&cols(&[(1, "2024-01-03")])).unwrap();

    assert_eq!(session.pending_total(), 0);
    assert!(store
        .calls()
        .contains(&Call::Append("s1:Hours".into(), vec!["2024-01-03".into(), "".into()])));
    assert_eq!(session.grid().row_count(), 3);
    assert!(store.batch_writes().is_empty());
}

#[test]
fn empty_worksheet_grows_from_default_width() {
    let store = MemoryStore::new().with_worksheet("s2", "Blank", &[]);
    let mut session = SheetSession::new(&store, SessionOptions::default());
    session.open("s2", &NoAliases).unwrap();
    assert!(session.grid().is_empty());

    session.update_cell(0, 0, "Date").unwrap();
    assert_eq!(session.grid().width(), 5);
    session.flush_active().unwrap();
    assert_eq!(store.rows("s2", "Blank")[0][0], "Date");
}

#[test]
fn refresh_picks_up_remote_rows_and_keeps_pending_edits() {
    let store = timesheet();
    let mut session = open(&store);
    session.update_cell(1, 1, "9").unwrap();
    store.push_foreign_row("s1", "Hours", &["2024-01-05", "3"]);

    session.refresh().unwrap();
    assert_eq!(session.grid().row_count(), 3);
    assert_eq!(session.grid().get(1, 1), Some("9"));
    assert_eq!(session.grid().get(2, 0), Some("2024-01-05"));
    assert_eq!(session.pending(&hours()).len(), 1);
}
