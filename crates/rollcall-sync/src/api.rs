//! The attendance API contract.
//!
//! [`AttendanceApi`] is the seam between the workflows and whatever serves the
//! data. [`crate::ApiClient`] implements it over HTTP; tests implement it in
//! memory.

use async_trait::async_trait;
use chrono::NaiveDate;
use rollcall_core::{
    AttendanceRecord, NewStudent, OverviewStatistics, Student, StudentStatistics, StudentUpdate,
};
use serde::Deserialize;

use crate::error::SyncError;

/// Filters for `GET /api/attendance`. Both unset lists every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub date: Option<NaiveDate>,
    pub student_id: Option<String>,
}

impl RecordFilter {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            student_id: None,
        }
    }

    pub fn for_student(student_id: impl Into<String>) -> Self {
        Self {
            date: None,
            student_id: Some(student_id.into()),
        }
    }

    /// Query-string pairs in the order the backend documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(date) = self.date {
            pairs.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(id) = &self.student_id {
            pairs.push(("student_id", id.clone()));
        }
        pairs
    }

    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.date.is_none_or(|d| record.date == d)
            && self
                .student_id
                .as_deref()
                .is_none_or(|id| record.student_id == id)
    }
}

/// Acknowledgement body returned by mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn list_students(&self) -> Result<Vec<Student>, SyncError>;

    async fn create_student(&self, student: &NewStudent) -> Result<Ack, SyncError>;

    async fn update_student(
        &self,
        student_id: &str,
        update: &StudentUpdate,
    ) -> Result<Ack, SyncError>;

    /// The backend also deletes the student's attendance records.
    async fn delete_student(&self, student_id: &str) -> Result<Ack, SyncError>;

    async fn list_attendance(&self, filter: &RecordFilter)
    -> Result<Vec<AttendanceRecord>, SyncError>;

    /// Replace the stored records for each `(student_id, date)` in `batch`.
    async fn save_attendance(&self, batch: &[AttendanceRecord]) -> Result<Ack, SyncError>;

    async fn overview_statistics(&self) -> Result<OverviewStatistics, SyncError>;

    async fn student_statistics(&self, student_id: &str) -> Result<StudentStatistics, SyncError>;
}
