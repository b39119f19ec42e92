//! Attendance API client: the remote-data contract, its HTTP implementation, and the
//! fetch/save workflows built on top of it.

pub mod api;
mod error;
pub mod workflow;

#[cfg(feature = "http")]
pub mod http;

pub use api::{Ack, AttendanceApi, RecordFilter};
pub use error::{SyncError, WorkflowError};

#[cfg(feature = "http")]
pub use http::{ApiClient, Health};
