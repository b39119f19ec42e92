//! Save batch preparation for the replace-for-date attendance save.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::model::{AttendanceRecord, Student};
use crate::reconcile::AttendanceView;

/// Build the payload for `POST /api/attendance`: one record per roster
/// student, in roster order, all dated `date`.
///
/// Students missing from `view` are saved as absent. Notes held by the view
/// are carried over so the replace does not erase them. A `student_id` that
/// appears twice on the roster is emitted once.
pub fn prepare_save_batch(
    roster: &[Student],
    view: &AttendanceView,
    date: NaiveDate,
) -> Vec<AttendanceRecord> {
    let mut seen = HashSet::with_capacity(roster.len());
    roster
        .iter()
        .filter(|s| seen.insert(s.student_id.as_str()))
        .map(|s| {
            let mut record = AttendanceRecord::new(&s.student_id, date, view.status(&s.student_id));
            record.notes = view.note(&s.student_id).map(str::to_string);
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Fetch;
    use crate::model::AttendanceStatus;
    use crate::reconcile::reconcile;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn roster() -> Vec<Student> {
        vec![
            Student::new("S1", "Ada"),
            Student::new("S2", "Grace"),
            Student::new("S3", "Linus"),
        ]
    }

    #[test]
    fn reconcile_then_save_end_to_end() {
        let d = day("2024-05-01");
        let records = Fetch::Available(vec![
            AttendanceRecord::new("S1", d, AttendanceStatus::Present),
            AttendanceRecord::new("S3", d, AttendanceStatus::Late),
        ]);
        let view = reconcile(&roster(), &records, d).unwrap();
        assert_eq!(view.status("S1"), AttendanceStatus::Present);
        assert_eq!(view.status("S2"), AttendanceStatus::Absent);
        assert_eq!(view.status("S3"), AttendanceStatus::Late);

        let batch = prepare_save_batch(&roster(), &view, d);
        let got: Vec<(&str, NaiveDate, &str)> = batch
            .iter()
            .map(|r| (r.student_id.as_str(), r.date, r.raw_status.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![("S1", d, "present"), ("S2", d, "absent"), ("S3", d, "late")]
        );
    }

    #[test]
    fn batch_is_idempotent() {
        let d = day("2024-05-01");
        let records = Fetch::Available(vec![
            AttendanceRecord::new("S2", d, AttendanceStatus::Late).with_notes("train"),
        ]);
        let view = reconcile(&roster(), &records, d).unwrap();
        let first = serde_json::to_string(&prepare_save_batch(&roster(), &view, d)).unwrap();
        let second = serde_json::to_string(&prepare_save_batch(&roster(), &view, d)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn notes_survive_into_batch() {
        let d = day("2024-05-01");
        let records = Fetch::Available(vec![
            AttendanceRecord::new("S2", d, AttendanceStatus::Late).with_notes("train"),
        ]);
        let view = reconcile(&roster(), &records, d).unwrap();
        let batch = prepare_save_batch(&roster(), &view, d);
        assert_eq!(batch[1].notes.as_deref(), Some("train"));
        assert!(batch[0].notes.is_none());
    }

    #[test]
    fn students_missing_from_view_saved_absent() {
        let d = day("2024-05-01");
        let view = reconcile(&roster()[..1], &Fetch::Available(vec![]), d).unwrap();
        let batch = prepare_save_batch(&roster(), &view, d);
        assert_eq!(batch.len(), 3);
        assert!(batch.iter().all(|r| r.raw_status == "absent"));
    }

    #[test]
    fn repeated_roster_ids_emitted_once() {
        let d = day("2024-05-01");
        let mut r = roster();
        r.push(Student::new("S1", "Ada again"));
        let view = reconcile(&r, &Fetch::Available(vec![]), d).unwrap();
        let batch = prepare_save_batch(&r, &view, d);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn batch_uses_requested_date() {
        let view = reconcile(&roster(), &Fetch::Available(vec![]), day("2024-05-01")).unwrap();
        let batch = prepare_save_batch(&roster(), &view, day("2024-05-02"));
        assert!(batch.iter().all(|r| r.date == day("2024-05-02")));
    }
}
