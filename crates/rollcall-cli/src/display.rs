//! Terminal rendering for roster, attendance sheets and reports.

use rollcall_core::{AttendanceRecord, StatisticsSummary, Student, StudentReportRow};
use rollcall_sync::workflow::{AttendanceSheet, Dashboard, StudentReport, SummarySource};

const MAX_NAME: usize = 28;
const MAX_NOTES: usize = 40;

// ── Roster ──

pub fn print_students(students: &[Student]) {
    if students.is_empty() {
        println!("No students found. Add one with `rollcall students add`.");
        return;
    }
    println!(
        "{:<12} {:<28} {:<28} {:<16} {}",
        "Student ID", "Name", "Email", "Phone", "Course"
    );
    for s in students {
        println!(
            "{:<12} {:<28} {:<28} {:<16} {}",
            s.student_id,
            clip(&s.name, MAX_NAME),
            clip(or_dash(s.email.as_deref()), MAX_NAME),
            or_dash(s.phone.as_deref()),
            or_dash(s.course.as_deref()),
        );
    }
    println!();
    println!("{} students", students.len());
}

// ── Attendance sheet ──

pub fn print_sheet(sheet: &AttendanceSheet) {
    println!("=== Attendance for {} ===", sheet.date);
    if let Some(warning) = sheet.warning() {
        println!("warning: {warning}");
    }
    println!();

    if sheet.roster.is_empty() {
        println!("No students found. Please add students first.");
        return;
    }

    println!("{:<12} {:<28} {:<16} {:<8} {}", "Student ID", "Name", "Course", "Status", "Notes");
    for (student, status, note) in sheet.rows() {
        println!(
            "{:<12} {:<28} {:<16} {:<8} {}",
            student.student_id,
            clip(&student.name, MAX_NAME),
            or_dash(student.course.as_deref()),
            status_label(status.as_str()),
            clip(or_dash(note), MAX_NOTES),
        );
    }
    println!();

    if let Ok(summary) = sheet.summary() {
        println!(
            "present {}  absent {}  late {}",
            summary.present_count, summary.absent_count, summary.late_count
        );
    }
}

// ── Records ──

pub fn print_records(records: &[AttendanceRecord]) {
    if records.is_empty() {
        println!("No attendance records found.");
        return;
    }
    println!(
        "{:<10}  {:<12} {:<28} {:<16} {:<8} {}",
        "Date", "Student ID", "Name", "Course", "Status", "Notes"
    );
    for r in records {
        println!(
            "{:<10}  {:<12} {:<28} {:<16} {:<8} {}",
            r.date,
            r.student_id,
            clip(or_dash(r.student_name.as_deref()), MAX_NAME),
            or_dash(r.course.as_deref()),
            status_label(&r.raw_status),
            clip(or_dash(r.notes.as_deref()), MAX_NOTES),
        );
    }
}

// ── Statistics ──

fn print_summary(header: &str, summary: &StatisticsSummary) {
    println!("{header}");
    println!("  {:<26} {}", "Total Records", summary.total_records);
    println!("  {:<26} {}", "Present", summary.present_count);
    println!("  {:<26} {}", "Absent", summary.absent_count);
    println!("  {:<26} {}", "Late", summary.late_count);
    println!("  {:<26} {}%", "Attendance Rate", summary.attendance_percentage);
    println!();
}

pub fn print_dashboard(dash: &Dashboard, today: chrono::NaiveDate) {
    println!("=== Dashboard ===");
    for w in &dash.warnings {
        println!("warning: {w}");
    }
    println!();

    println!("  {:<26} {}", "Total Students", dash.overview.total_students);
    println!();
    print_summary("All Records", &dash.overview.summary);
    print_summary(&format!("Today ({today})"), &dash.today_summary);

    if dash.today.is_empty() {
        println!("No attendance records for today yet.");
    } else {
        print_records(&dash.today);
        if dash.today_summary.total_records as usize > dash.today.len() {
            println!(
                "... and {} more",
                dash.today_summary.total_records as usize - dash.today.len()
            );
        }
    }
}

pub fn print_student_report(report: &StudentReport, student: Option<&Student>) {
    match student {
        Some(s) => println!("=== {} - {} ===", s.student_id, s.name),
        None => println!("=== {} ===", report.student_id),
    }
    for w in &report.warnings {
        println!("warning: {w}");
    }
    println!();

    match &report.summary {
        Some((summary, SummarySource::Server)) => print_summary("Statistics", summary),
        Some((summary, SummarySource::History)) => {
            print_summary("Statistics (from history)", summary)
        }
        None => println!("No attendance data available for this student.\n"),
    }

    if report.history.is_empty() {
        return;
    }
    println!("Attendance History");
    for r in &report.history {
        println!(
            "  {:<10}  {:<8} {}",
            r.date,
            status_label(&r.raw_status),
            clip(or_dash(r.notes.as_deref()), MAX_NOTES)
        );
    }
}

pub fn print_roster_report(rows: &[StudentReportRow]) {
    if rows.is_empty() {
        println!("No students found.");
        return;
    }
    println!(
        "{:<12} {:<28} {:>7} {:>7} {:>7} {:>7} {:>8}",
        "Student ID", "Name", "Total", "Present", "Absent", "Late", "Rate"
    );
    for row in rows {
        let s = &row.summary;
        println!(
            "{:<12} {:<28} {:>7} {:>7} {:>7} {:>7} {:>7}%",
            row.student.student_id,
            clip(&row.student.name, MAX_NAME),
            s.total_records,
            s.present_count,
            s.absent_count,
            s.late_count,
            s.attendance_percentage,
        );
    }
}

// ── Helpers ──

fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

/// "present" → "Present"
fn status_label(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_label_capitalises() {
        assert_eq!(status_label("present"), "Present");
        assert_eq!(status_label("late"), "Late");
        assert_eq!(status_label(""), "");
    }

    #[test]
    fn clip_counts_chars_not_bytes() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("Zoë Åkesson-Lindqvist", 10), "Zoë Åke...");
    }

    #[test]
    fn or_dash_blank() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("Maths")), "Maths");
    }
}
