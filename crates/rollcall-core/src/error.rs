use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("record for {student_id} on {date} has invalid status {status:?}")]
    InvalidStatus {
        student_id: String,
        date: NaiveDate,
        status: String,
    },

    #[error("conflicting attendance records for {student_id} on {date}")]
    ConflictingRecords { student_id: String, date: NaiveDate },

    #[error("{0} is required")]
    MissingField(&'static str),
}
