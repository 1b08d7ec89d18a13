//! Formula values written on the user's behalf.

use chrono::{NaiveTime, Timelike};

/// `=TIME(h, m, 00)` for a wall-clock time, seconds dropped.
///
/// Sent with user-entered semantics, so the store keeps it as a time value
/// instead of the text "14:30".
pub fn time_formula(time: NaiveTime) -> String {
    format!("=TIME({}, {}, 00)", time.hour(), time.minute())
}
