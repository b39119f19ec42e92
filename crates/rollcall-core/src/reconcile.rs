//! Roster reconciliation: map one day's attendance records onto the full roster.
//!
//! The backend only stores rows for students someone has marked, so a day's
//! records are usually a subset of the roster. Reconciliation fills the gaps
//! with [`AttendanceStatus::Absent`] and produces an [`AttendanceView`] with
//! exactly one entry per roster student.
//!
//! # Duplicate records
//!
//! The backend keys attendance on `(student_id, date)`, so two records for the
//! same student on the same day indicate a broken data source. Duplicates that
//! agree on status are collapsed (the last one carrying notes supplies the
//! notes); duplicates that disagree are rejected with
//! [`CoreError::ConflictingRecords`] instead of letting list order decide.
//!
//! Records for students not on the roster are ignored apart from status
//! validation: a bad status anywhere in the day fails reconciliation, but a
//! duplicate for a student who has left the roster does not block the sheet.

use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::fetch::Fetch;
use crate::model::{AttendanceRecord, AttendanceStatus, Student};

/// Per-student attendance for one date, covering every roster student.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceView {
    date: NaiveDate,
    statuses: HashMap<String, AttendanceStatus>,
    notes: HashMap<String, String>,
    unavailable: Option<String>,
}

impl AttendanceView {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Status for `student_id`, or `None` if the student is not in the view.
    pub fn get(&self, student_id: &str) -> Option<AttendanceStatus> {
        self.statuses.get(student_id).copied()
    }

    /// Status for `student_id`, defaulting to absent.
    pub fn status(&self, student_id: &str) -> AttendanceStatus {
        self.get(student_id).unwrap_or_default()
    }

    pub fn note(&self, student_id: &str) -> Option<&str> {
        self.notes.get(student_id).map(String::as_str)
    }

    /// Change a student's status. Returns `false` if the student is not on
    /// the roster this view was built from.
    pub fn set_status(&mut self, student_id: &str, status: AttendanceStatus) -> bool {
        match self.statuses.get_mut(student_id) {
            Some(slot) => {
                *slot = status;
                true
            }
            None => false,
        }
    }

    /// Attach or clear a note. Returns `false` for students outside the view.
    pub fn set_note(&mut self, student_id: &str, note: Option<String>) -> bool {
        if !self.statuses.contains_key(student_id) {
            return false;
        }
        match note.filter(|n| !n.trim().is_empty()) {
            Some(n) => {
                self.notes.insert(student_id.to_string(), n);
            }
            None => {
                self.notes.remove(student_id);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AttendanceStatus)> {
        self.statuses.iter().map(|(id, s)| (id.as_str(), *s))
    }

    /// True when the view was built without records because the fetch failed.
    pub fn is_degraded(&self) -> bool {
        self.unavailable.is_some()
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }
}

/// Build the attendance view for `date` from the roster and that day's records.
///
/// `records` must already be scoped to `date`; they are not filtered here.
/// Records for students not on the roster are ignored once their status has
/// been validated. When `records` is
/// [`Fetch::Unavailable`] every student is absent and the view is marked
/// degraded.
pub fn reconcile(
    roster: &[Student],
    records: &Fetch<Vec<AttendanceRecord>>,
    date: NaiveDate,
) -> Result<AttendanceView, CoreError> {
    let (marked, notes, unavailable) = match records {
        Fetch::Available(records) => {
            let (marked, notes) = index_records(roster, records)?;
            (marked, notes, None)
        }
        Fetch::Unavailable(reason) => {
            warn!(%date, reason = %reason, "attendance records unavailable, defaulting roster to absent");
            (HashMap::new(), HashMap::new(), Some(reason.clone()))
        }
    };

    let mut statuses = HashMap::with_capacity(roster.len());
    let mut kept_notes = HashMap::new();
    for student in roster {
        let id = &student.student_id;
        statuses.insert(id.clone(), marked.get(id).copied().unwrap_or_default());
        if let Some(note) = notes.get(id) {
            kept_notes.insert(id.clone(), note.clone());
        }
    }

    debug!(
        %date,
        roster = roster.len(),
        marked = marked.len(),
        "reconciled attendance"
    );

    Ok(AttendanceView {
        date,
        statuses,
        notes: kept_notes,
        unavailable,
    })
}

type RecordIndex = (HashMap<String, AttendanceStatus>, HashMap<String, String>);

fn index_records(roster: &[Student], records: &[AttendanceRecord]) -> Result<RecordIndex, CoreError> {
    let on_roster: HashSet<&str> = roster.iter().map(|s| s.student_id.as_str()).collect();
    let mut statuses: HashMap<String, AttendanceStatus> = HashMap::with_capacity(records.len());
    let mut notes = HashMap::new();

    for record in records {
        let status = record.status()?;
        if !on_roster.contains(record.student_id.as_str()) {
            continue;
        }
        match statuses.entry(record.student_id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(status);
            }
            Entry::Occupied(slot) if *slot.get() == status => {}
            Entry::Occupied(_) => {
                return Err(CoreError::ConflictingRecords {
                    student_id: record.student_id.clone(),
                    date: record.date,
                });
            }
        }
        if let Some(note) = record.notes.as_ref().filter(|n| !n.trim().is_empty()) {
            notes.insert(record.student_id.clone(), note.clone());
        }
    }

    Ok((statuses, notes))
}
