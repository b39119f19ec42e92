//! Fetch/save workflows behind each screen.
//!
//! Every function takes any [`AttendanceApi`], fetches what its screen needs,
//! and hands back a view model built with `rollcall_core`. Transient fetch
//! failures degrade to defaults plus a warning wherever a partial screen is
//! still useful; failures that leave nothing to show are returned as
//! [`WorkflowError`].

use chrono::NaiveDate;
use rollcall_core::{
    AttendanceRecord, AttendanceStatus, AttendanceView, Fetch, NewStudent, OverviewStatistics,
    StatisticsSummary, Student, StudentReportRow, StudentUpdate, aggregate, most_recent,
    prepare_save_batch, reconcile, roster_report, sort_history,
};
use tracing::{info, warn};

use crate::api::{Ack, AttendanceApi, RecordFilter};
use crate::error::WorkflowError;

/// Rows shown in the dashboard's "today" table.
pub const DASHBOARD_RECENT_LIMIT: usize = 10;

/// Default row cap for the records listing.
pub const RECORDS_LIMIT: usize = 50;

/// The roster reconciled against one day's records, ready for editing.
#[derive(Debug, Clone)]
pub struct AttendanceSheet {
    pub date: NaiveDate,
    pub roster: Vec<Student>,
    pub view: AttendanceView,
}

impl AttendanceSheet {
    /// Roster-ordered rows of `(student, status, note)`.
    pub fn rows(&self) -> impl Iterator<Item = (&Student, AttendanceStatus, Option<&str>)> {
        self.roster.iter().map(|s| {
            (
                s,
                self.view.status(&s.student_id),
                self.view.note(&s.student_id),
            )
        })
    }

    /// Warning to display when the day's records could not be loaded.
    pub fn warning(&self) -> Option<String> {
        self.view.unavailable_reason().map(|reason| {
            format!(
                "attendance for {} could not be loaded ({reason}); everyone is shown as absent",
                self.date
            )
        })
    }

    /// The batch [`save_sheet`] would send.
    pub fn batch(&self) -> Vec<AttendanceRecord> {
        prepare_save_batch(&self.roster, &self.view, self.date)
    }

    pub fn summary(&self) -> Result<StatisticsSummary, WorkflowError> {
        Ok(aggregate(&self.batch())?)
    }
}

pub async fn load_roster<A>(api: &A) -> Result<Vec<Student>, WorkflowError>
where
    A: AttendanceApi + ?Sized,
{
    api.list_students()
        .await
        .map_err(WorkflowError::RosterUnavailable)
}

/// Load the roster and `date`'s records and reconcile them.
///
/// A roster failure is fatal. A records failure yields a degraded sheet with
/// everyone absent; check [`AttendanceSheet::warning`].
pub async fn open_sheet<A>(api: &A, date: NaiveDate) -> Result<AttendanceSheet, WorkflowError>
where
    A: AttendanceApi + ?Sized,
{
    let roster = load_roster(api).await?;
    let fetched = api.list_attendance(&RecordFilter::for_date(date)).await;
    if let Err(e) = &fetched {
        warn!(%date, error = %e, "attendance fetch failed");
    }
    let records = Fetch::from_result(fetched.map_err(|e| e.user_message()));
    let view = reconcile(&roster, &records, date)?;
    Ok(AttendanceSheet { date, roster, view })
}

/// Send the sheet as one replace-for-date batch.
///
/// The sheet is only borrowed, so on [`WorkflowError::SaveRejected`] the
/// caller still holds every edit and can retry.
pub async fn save_sheet<A>(api: &A, sheet: &AttendanceSheet) -> Result<Ack, WorkflowError>
where
    A: AttendanceApi + ?Sized,
{
    let batch = sheet.batch();
    api.save_attendance(&batch)
        .await
        .map_err(|e| WorkflowError::SaveRejected {
            message: e.user_message(),
        })
}

pub async fn add_student<A>(api: &A, student: NewStudent) -> Result<Ack, WorkflowError>
where
    A: AttendanceApi + ?Sized,
{
    let student = student.normalized();
    student.validate()?;
    api.create_student(&student)
        .await
        .map_err(|e| WorkflowError::StudentRejected {
            message: e.user_message(),
        })
}

pub async fn edit_student<A>(
    api: &A,
    student_id: &str,
    update: StudentUpdate,
) -> Result<Ack, WorkflowError>
where
    A: AttendanceApi + ?Sized,
{
    let update = update.normalized();
    update.validate()?;
    api.update_student(student_id, &update)
        .await
        .map_err(|e| WorkflowError::StudentRejected {
            message: e.user_message(),
        })
}

/// Delete a student. The backend cascades to their attendance records.
pub async fn remove_student<A>(api: &A, student_id: &str) -> Result<Ack, WorkflowError>
where
    A: AttendanceApi + ?Sized,
{
    api.delete_student(student_id)
        .await
        .map_err(|e| WorkflowError::StudentRejected {
            message: e.user_message(),
        })
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub overview: OverviewStatistics,
    /// Today's records, newest first, capped at [`DASHBOARD_RECENT_LIMIT`].
    pub today: Vec<AttendanceRecord>,
    /// Summary over all of today's records, not just the displayed ones.
    pub today_summary: StatisticsSummary,
    pub warnings: Vec<String>,
}

/// Fetch overview statistics and today's records concurrently.
///
/// Each half falls back to its zero value independently, with a warning.
pub async fn load_dashboard<A>(api: &A, today: NaiveDate) -> Result<Dashboard, WorkflowError>
where
    A: AttendanceApi + ?Sized,
{
    let filter = RecordFilter::for_date(today);
    let (overview, records) =
        futures::join!(api.overview_statistics(), api.list_attendance(&filter));

    let mut warnings = Vec::new();
    let overview = match overview {
        Ok(o) => o,
        Err(e) => {
            warn!(error = %e, "overview statistics unavailable");
            warnings.push(format!("statistics unavailable: {}", e.user_message()));
            OverviewStatistics::default()
        }
    };
    let records = match records {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, %today, "today's attendance unavailable");
            warnings.push(format!("today's attendance unavailable: {}", e.user_message()));
            Vec::new()
        }
    };

    let today_summary = aggregate(&records)?;
    Ok(Dashboard {
        overview,
        today: most_recent(records, DASHBOARD_RECENT_LIMIT),
        today_summary,
        warnings,
    })
}

/// Where a report's summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    Server,
    /// Aggregated from the fetched history because the statistics endpoint failed.
    History,
}

#[derive(Debug, Clone)]
pub struct StudentReport {
    pub student_id: String,
    pub summary: Option<(StatisticsSummary, SummarySource)>,
    /// Newest first.
    pub history: Vec<AttendanceRecord>,
    pub warnings: Vec<String>,
}

/// Fetch a student's statistics and history concurrently.
pub async fn load_student_report<A>(
    api: &A,
    student_id: &str,
) -> Result<StudentReport, WorkflowError>
where
    A: AttendanceApi + ?Sized,
{
    let filter = RecordFilter::for_student(student_id);
    let (stats, history) = futures::join!(
        api.student_statistics(student_id),
        api.list_attendance(&filter)
    );

    let mut warnings = Vec::new();
    let history = match history {
        Ok(h) => Fetch::Available(sort_history(h)),
        Err(e) => {
            warn!(student_id, error = %e, "attendance history unavailable");
            warnings.push(format!("history unavailable: {}", e.user_message()));
            Fetch::Unavailable(e.user_message())
        }
    };

    let summary = match (stats, &history) {
        (Ok(stats), _) => Some((stats.summary, SummarySource::Server)),
        (Err(e), Fetch::Available(records)) => {
            warn!(student_id, error = %e, "student statistics unavailable, aggregating history");
            warnings.push(format!(
                "statistics unavailable ({}); computed from history",
                e.user_message()
            ));
            Some((aggregate(records)?, SummarySource::History))
        }
        (Err(e), Fetch::Unavailable(_)) => {
            warnings.push(format!("statistics unavailable: {}", e.user_message()));
            None
        }
    };

    Ok(StudentReport {
        student_id: student_id.to_string(),
        summary,
        history: history.unwrap_or_default(),
        warnings,
    })
}

/// Per-student summaries for the whole roster.
pub async fn load_roster_report<A>(api: &A) -> Result<Vec<StudentReportRow>, WorkflowError>
where
    A: AttendanceApi + ?Sized,
{
    let filter = RecordFilter::default();
    let (roster, records) = futures::join!(api.list_students(), api.list_attendance(&filter));
    let roster = roster.map_err(WorkflowError::RosterUnavailable)?;
    let records = records.map_err(WorkflowError::RecordsUnavailable)?;
    info!(students = roster.len(), records = records.len(), "building roster report");
    Ok(roster_report(&roster, &records)?)
}

/// Records matching `filter`, newest first, at most `limit`.
pub async fn list_records<A>(
    api: &A,
    filter: &RecordFilter,
    limit: usize,
) -> Result<Vec<AttendanceRecord>, WorkflowError>
where
    A: AttendanceApi + ?Sized,
{
    let records = api
        .list_attendance(filter)
        .await
        .map_err(WorkflowError::RecordsUnavailable)?;
    Ok(most_recent(records, limit))
}
