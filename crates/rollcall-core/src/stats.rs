//! Attendance statistics.
//!
//! Only `present` counts toward the attendance rate; `late` and `absent` are
//! not partial credit. An unknown status fails the whole aggregation rather
//! than being skipped, so counts are never silently wrong.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::model::{AttendanceRecord, AttendanceStatus, StatisticsSummary, Student, StudentReportRow};

/// Tally `records` by status.
pub fn aggregate(records: &[AttendanceRecord]) -> Result<StatisticsSummary, CoreError> {
    tally(records)
}

/// [`aggregate`] restricted to one student's records.
pub fn aggregate_for_student(
    records: &[AttendanceRecord],
    student_id: &str,
) -> Result<StatisticsSummary, CoreError> {
    tally(records.iter().filter(|r| r.student_id == student_id))
}

fn tally<'a>(
    records: impl IntoIterator<Item = &'a AttendanceRecord>,
) -> Result<StatisticsSummary, CoreError> {
    let mut summary = StatisticsSummary::default();
    for record in records {
        summary.count(record.status()?);
    }
    summary.attendance_percentage = percentage(summary.present_count, summary.total_records);
    Ok(summary)
}

/// One summary per roster student, in roster order. Students without records
/// get a zero summary; records for students not on the roster are validated
/// but otherwise ignored.
pub fn roster_report(
    roster: &[Student],
    records: &[AttendanceRecord],
) -> Result<Vec<StudentReportRow>, CoreError> {
    let mut by_student: HashMap<&str, StatisticsSummary> = HashMap::new();
    for record in records {
        let status = record.status()?;
        by_student
            .entry(record.student_id.as_str())
            .or_default()
            .count(status);
    }

    Ok(roster
        .iter()
        .map(|student| {
            let mut summary = by_student
                .get(student.student_id.as_str())
                .cloned()
                .unwrap_or_default();
            summary.attendance_percentage =
                percentage(summary.present_count, summary.total_records);
            StudentReportRow {
                student: student.clone(),
                summary,
            }
        })
        .collect())
}

impl StatisticsSummary {
    fn count(&mut self, status: AttendanceStatus) {
        self.total_records += 1;
        match status {
            AttendanceStatus::Present => self.present_count += 1,
            AttendanceStatus::Absent => self.absent_count += 1,
            AttendanceStatus::Late => self.late_count += 1,
        }
    }
}

/// `present / total * 100` rounded to two decimals, ties to even as the
/// backend's `round(x, 2)` does; 0 when `total` is 0.
pub fn percentage(present: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = present as f64 * 100.0 / total as f64;
    (raw * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn records(id: &str, statuses: &[AttendanceStatus]) -> Vec<AttendanceRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let date = day("2024-01-01") + chrono::Days::new(i as u64);
                AttendanceRecord::new(id, date, *s)
            })
            .collect()
    }

    #[test]
    fn empty_input_is_all_zero() {
        let summary = aggregate(&[]).unwrap();
        assert_eq!(summary, StatisticsSummary::default());
        assert_eq!(summary.attendance_percentage, 0.0);
    }

    #[test]
    fn seven_of_ten_present_is_seventy_percent() {
        use AttendanceStatus::*;
        let recs = records(
            "S1",
            &[Present, Present, Absent, Present, Late, Present, Present, Absent, Present, Present],
        );
        let summary = aggregate(&recs).unwrap();
        assert_eq!(summary.total_records, 10);
        assert_eq!(summary.present_count, 7);
        assert_eq!(summary.absent_count, 2);
        assert_eq!(summary.late_count, 1);
        assert_eq!(summary.attendance_percentage, 70.0);
    }

    #[test]
    fn late_is_not_partial_credit() {
        use AttendanceStatus::*;
        let summary = aggregate(&records("S1", &[Late, Late, Present])).unwrap();
        assert_eq!(summary.attendance_percentage, 33.33);
    }

    #[test]
    fn halves_round_to_even() {
        // 1/32 = 3.125%, 3/32 = 9.375%
        assert_eq!(percentage(1, 32), 3.12);
        assert_eq!(percentage(3, 32), 9.38);
        assert_eq!(percentage(2, 3), 66.67);
    }

    #[test]
    fn order_does_not_matter() {
        use AttendanceStatus::*;
        let mut recs = records("S1", &[Present, Absent, Late, Present]);
        let forward = aggregate(&recs).unwrap();
        recs.reverse();
        assert_eq!(aggregate(&recs).unwrap(), forward);
    }

    #[test]
    fn unknown_status_fails() {
        let mut recs = records("S1", &[AttendanceStatus::Present]);
        let mut sick = AttendanceRecord::new("S2", day("2024-02-01"), AttendanceStatus::Absent);
        sick.raw_status = "sick".into();
        recs.push(sick);
        let err = aggregate(&recs).unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatus { ref status, .. } if status == "sick"));
    }

    #[test]
    fn per_student_filter() {
        use AttendanceStatus::*;
        let mut recs = records("S1", &[Present, Present]);
        recs.extend(records("S2", &[Absent]));
        let s1 = aggregate_for_student(&recs, "S1").unwrap();
        assert_eq!(s1.total_records, 2);
        assert_eq!(s1.attendance_percentage, 100.0);
        let nobody = aggregate_for_student(&recs, "S9").unwrap();
        assert_eq!(nobody.total_records, 0);
    }

    #[test]
    fn roster_report_follows_roster_order() {
        use AttendanceStatus::*;
        let roster = vec![
            Student::new("S2", "Grace"),
            Student::new("S1", "Ada"),
            Student::new("S3", "Linus"),
        ];
        let mut recs = records("S1", &[Present, Absent]);
        recs.extend(records("S2", &[Late]));
        recs.extend(records("GONE", &[Present]));

        let rows = roster_report(&roster, &recs).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.student.student_id.as_str()).collect();
        assert_eq!(ids, vec!["S2", "S1", "S3"]);
        assert_eq!(rows[0].summary.late_count, 1);
        assert_eq!(rows[1].summary.attendance_percentage, 50.0);
        assert_eq!(rows[2].summary, StatisticsSummary::default());
    }
}
