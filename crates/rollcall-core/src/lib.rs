//! Attendance core: roster reconciliation, save batches, statistics and history ordering.

pub mod error;
pub mod fetch;
pub mod history;
pub mod model;
pub mod reconcile;
pub mod save;
pub mod stats;

pub use error::CoreError;
pub use fetch::Fetch;
pub use history::{most_recent, sort_history};
pub use model::{
    AttendanceRecord, AttendanceStatus, NewStudent, OverviewStatistics, StatisticsSummary,
    Student, StudentReportRow, StudentStatistics, StudentUpdate, UnknownStatus,
};
pub use reconcile::{AttendanceView, reconcile};
pub use save::prepare_save_batch;
pub use stats::{aggregate, aggregate_for_student, roster_report};
