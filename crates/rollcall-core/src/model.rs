//! Shared attendance types exchanged with the attendance API.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A student on the roster, as returned by `GET /api/students`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Backend row id. Not used for identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    /// Backend creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Student {
    /// Roster entry with only the required fields set.
    pub fn new(student_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            student_id: student_id.into(),
            name: name.into(),
            email: None,
            phone: None,
            course: None,
            created_at: None,
        }
    }
}

/// Payload for `POST /api/students`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course: Option<String>,
}

impl NewStudent {
    /// Both `student_id` and `name` must be non-blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        require("student_id", &self.student_id)?;
        require("name", &self.name)
    }

    /// Trim every field and drop blank optional ones.
    pub fn normalized(self) -> Self {
        Self {
            student_id: self.student_id.trim().to_string(),
            name: self.name.trim().to_string(),
            email: blank_to_none(self.email),
            phone: blank_to_none(self.phone),
            course: blank_to_none(self.course),
        }
    }
}

/// Payload for `PUT /api/students/{student_id}`.
///
/// Carries every editable field; `student_id` is the path key and cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentUpdate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course: Option<String>,
}

impl StudentUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)
    }

    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: blank_to_none(self.email),
            phone: blank_to_none(self.phone),
            course: blank_to_none(self.course),
        }
    }
}

impl From<&Student> for StudentUpdate {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            course: student.course.clone(),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::MissingField(field));
    }
    Ok(())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Attendance status for one student on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    #[default]
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `present`, `absent`, `late`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attendance status {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for AttendanceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "late" => Ok(Self::Late),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// One row of `GET /api/attendance`, or one element of a save batch.
///
/// `status` is kept as the wire string; use [`AttendanceRecord::status`] to
/// parse it. `student_name` and `course` are display projections joined in by
/// the backend and are never sent back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub student_id: String,
    pub date: NaiveDate,
    #[serde(rename = "status")]
    pub raw_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing)]
    pub student_name: Option<String>,
    #[serde(default, skip_serializing)]
    pub course: Option<String>,
}

impl AttendanceRecord {
    pub fn new(student_id: impl Into<String>, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            id: None,
            student_id: student_id.into(),
            date,
            raw_status: status.as_str().to_string(),
            notes: None,
            student_name: None,
            course: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Parsed status, or [`CoreError::InvalidStatus`] naming this record.
    pub fn status(&self) -> Result<AttendanceStatus, CoreError> {
        self.raw_status
            .parse()
            .map_err(|UnknownStatus(status)| CoreError::InvalidStatus {
                student_id: self.student_id.clone(),
                date: self.date,
                status,
            })
    }
}

/// Status counts and attendance rate over a set of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsSummary {
    pub total_records: u64,
    pub present_count: u64,
    pub absent_count: u64,
    pub late_count: u64,
    /// `present_count / total_records * 100`, rounded to two decimals.
    pub attendance_percentage: f64,
}

/// Response of `GET /api/statistics/overview`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewStatistics {
    #[serde(default)]
    pub total_students: u64,
    #[serde(flatten)]
    pub summary: StatisticsSummary,
}

/// Response of `GET /api/statistics/student/{student_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentStatistics {
    pub student_id: String,
    #[serde(flatten)]
    pub summary: StatisticsSummary,
}

/// One line of the roster-wide report.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentReportRow {
    pub student: Student,
    pub summary: StatisticsSummary,
}
