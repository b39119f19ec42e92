//! Most-recent-first ordering for attendance history.

use crate::model::AttendanceRecord;

/// Sort records by date, newest first. Records sharing a date keep their
/// original relative order.
pub fn sort_history(mut records: Vec<AttendanceRecord>) -> Vec<AttendanceRecord> {
    // `sort_by` is stable.
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
}

/// The `limit` newest records.
pub fn most_recent(records: Vec<AttendanceRecord>, limit: usize) -> Vec<AttendanceRecord> {
    let mut sorted = sort_history(records);
    sorted.truncate(limit);
    sorted
}
