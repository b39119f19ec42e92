mod display;

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rollcall_core::{AttendanceStatus, NewStudent, StudentUpdate};
use rollcall_sync::workflow::{self, RECORDS_LIMIT};
use rollcall_sync::{ApiClient, RecordFilter, WorkflowError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rollcall", version, about = "Student roster, daily attendance and reports")]
struct Cli {
    /// Base URL of the attendance API.
    #[arg(
        long,
        env = "ROLLCALL_API_URL",
        default_value = "http://localhost:5001",
        global = true
    )]
    api_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "ROLLCALL_TIMEOUT_SECS", default_value_t = 10, global = true)]
    timeout_secs: u64,

    /// Log requests and fallbacks to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the API is reachable.
    Health,
    /// Overall statistics and today's attendance.
    Dashboard,
    /// Manage the student roster.
    #[command(subcommand)]
    Students(StudentsCommand),
    /// View or mark attendance for a date.
    #[command(subcommand)]
    Attendance(AttendanceCommand),
    /// One student's statistics and history, or a roster-wide table.
    Report {
        #[arg(long)]
        student: Option<String>,
    },
    /// List attendance records, newest first.
    Records {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        student: Option<String>,
        #[arg(long, default_value_t = RECORDS_LIMIT)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum StudentsCommand {
    List,
    Add {
        student_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        course: Option<String>,
    },
    /// Change a student's details; omitted fields keep their value, "" clears one.
    Edit {
        student_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        course: Option<String>,
    },
    /// Delete a student and all of their attendance records.
    Delete { student_id: String },
}

#[derive(Subcommand)]
enum AttendanceCommand {
    /// Show the roster with each student's status for the date (default today).
    Show {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Set statuses and save the whole day. Unlisted students keep their current status.
    Mark {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, value_delimiter = ',')]
        present: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        absent: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        late: Vec<String>,
        /// STUDENT_ID=TEXT; an empty TEXT clears the note.
        #[arg(long, value_parser = parse_note)]
        note: Vec<(String, String)>,
        /// Save even if the day's existing records could not be loaded.
        #[arg(long)]
        force: bool,
    },
}

fn parse_note(s: &str) -> Result<(String, String), String> {
    let (id, text) = s
        .split_once('=')
        .ok_or_else(|| format!("expected STUDENT_ID=TEXT, got {s:?}"))?;
    if id.trim().is_empty() {
        return Err("student id is empty".to_string());
    }
    Ok((id.trim().to_string(), text.to_string()))
}

/// Flatten the per-status id lists, rejecting an id given more than one status.
fn status_edits(
    present: Vec<String>,
    absent: Vec<String>,
    late: Vec<String>,
) -> anyhow::Result<Vec<(String, AttendanceStatus)>> {
    let mut seen: HashMap<String, AttendanceStatus> = HashMap::new();
    let lists = [
        (AttendanceStatus::Present, present),
        (AttendanceStatus::Absent, absent),
        (AttendanceStatus::Late, late),
    ];
    let mut edits = Vec::new();
    for (status, ids) in lists {
        for id in ids {
            match seen.get(&id) {
                Some(&earlier) if earlier != status => {
                    bail!("{id} is marked both {earlier} and {status}");
                }
                Some(_) => {}
                None => {
                    seen.insert(id.clone(), status);
                    edits.push((id, status));
                }
            }
        }
    }
    Ok(edits)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(api_url = %cli.api_url, "rollcall v{}", env!("CARGO_PKG_VERSION"));

    let api = ApiClient::with_timeout(cli.api_url, Duration::from_secs(cli.timeout_secs))
        .context("building HTTP client")?;

    match cli.command {
        Command::Health => {
            let health = api
                .health()
                .await
                .with_context(|| format!("contacting {}", api.base_url()))?;
            println!("{}: {} (database {})", health.status, health.message, health.database);
        }
        Command::Dashboard => {
            let today = today();
            let dash = workflow::load_dashboard(&api, today).await?;
            display::print_dashboard(&dash, today);
        }
        Command::Students(cmd) => run_students(&api, cmd).await?,
        Command::Attendance(cmd) => run_attendance(&api, cmd).await?,
        Command::Report { student: Some(id) } => {
            let (report, roster) = tokio::join!(
                workflow::load_student_report(&api, &id),
                workflow::load_roster(&api)
            );
            let report = report?;
            // The roster only supplies the display name.
            let roster = roster.unwrap_or_default();
            let student = roster.iter().find(|s| s.student_id == id);
            display::print_student_report(&report, student);
        }
        Command::Report { student: None } => {
            let rows = workflow::load_roster_report(&api).await?;
            display::print_roster_report(&rows);
        }
        Command::Records {
            date,
            student,
            limit,
        } => {
            let filter = RecordFilter {
                date,
                student_id: student,
            };
            let records = workflow::list_records(&api, &filter, limit).await?;
            display::print_records(&records);
        }
    }

    Ok(())
}

async fn run_students(api: &ApiClient, cmd: StudentsCommand) -> anyhow::Result<()> {
    match cmd {
        StudentsCommand::List => {
            let students = workflow::load_roster(api).await?;
            display::print_students(&students);
        }
        StudentsCommand::Add {
            student_id,
            name,
            email,
            phone,
            course,
        } => {
            let ack = workflow::add_student(
                api,
                NewStudent {
                    student_id,
                    name,
                    email,
                    phone,
                    course,
                },
            )
            .await?;
            println!("{}", ack.message);
        }
        StudentsCommand::Edit {
            student_id,
            name,
            email,
            phone,
            course,
        } => {
            let roster = workflow::load_roster(api).await?;
            let Some(current) = roster.iter().find(|s| s.student_id == student_id) else {
                bail!("student {student_id} not found");
            };
            let mut update = StudentUpdate::from(current);
            if let Some(name) = name {
                update.name = name;
            }
            if email.is_some() {
                update.email = email;
            }
            if phone.is_some() {
                update.phone = phone;
            }
            if course.is_some() {
                update.course = course;
            }
            let ack = workflow::edit_student(api, &student_id, update).await?;
            println!("{}", ack.message);
        }
        StudentsCommand::Delete { student_id } => {
            let ack = workflow::remove_student(api, &student_id).await?;
            println!("{}", ack.message);
        }
    }
    Ok(())
}

async fn run_attendance(api: &ApiClient, cmd: AttendanceCommand) -> anyhow::Result<()> {
    match cmd {
        AttendanceCommand::Show { date } => {
            let sheet = workflow::open_sheet(api, date.unwrap_or_else(today)).await?;
            display::print_sheet(&sheet);
        }
        AttendanceCommand::Mark {
            date,
            present,
            absent,
            late,
            note,
            force,
        } => {
            let mut sheet = workflow::open_sheet(api, date.unwrap_or_else(today)).await?;
            if let Some(warning) = sheet.warning() {
                if !force {
                    bail!("{warning}; not saving over records that could not be read (use --force)");
                }
                tracing::warn!("{warning}; saving anyway");
            }

            for (id, status) in status_edits(present, absent, late)? {
                if !sheet.view.set_status(&id, status) {
                    bail!("{id} is not on the roster");
                }
            }
            for (id, text) in note {
                if !sheet.view.set_note(&id, Some(text)) {
                    bail!("{id} is not on the roster");
                }
            }

            match workflow::save_sheet(api, &sheet).await {
                Ok(ack) => {
                    display::print_sheet(&sheet);
                    println!("{}", ack.message);
                }
                Err(e @ WorkflowError::SaveRejected { .. }) => {
                    display::print_sheet(&sheet);
                    return Err(e).context("attendance not saved; the edited sheet is shown above");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_note_splits_on_first_equals() {
        assert_eq!(
            parse_note("S1=left at 10=30").unwrap(),
            ("S1".to_string(), "left at 10=30".to_string())
        );
        assert_eq!(parse_note("S1=").unwrap(), ("S1".to_string(), String::new()));
        assert!(parse_note("S1").is_err());
        assert!(parse_note("=text").is_err());
    }

    #[test]
    fn mark_accepts_comma_lists_and_dates() {
        let cli = Cli::try_parse_from([
            "rollcall",
            "attendance",
            "mark",
            "--date",
            "2024-05-01",
            "--present",
            "S1,S2",
            "--late",
            "S3",
            "--note",
            "S3=bus",
        ])
        .unwrap();
        let Command::Attendance(AttendanceCommand::Mark {
            date,
            present,
            late,
            note,
            force,
            ..
        }) = cli.command
        else {
            panic!("expected attendance mark");
        };
        assert_eq!(date, Some("2024-05-01".parse().unwrap()));
        assert_eq!(present, vec!["S1", "S2"]);
        assert_eq!(late, vec!["S3"]);
        assert_eq!(note, vec![("S3".to_string(), "bus".to_string())]);
        assert!(!force);
        assert_eq!(cli.api_url, "http://localhost:5001");
    }

    #[test]
    fn status_edits_reject_conflicting_lists() {
        let err = status_edits(
            vec!["S1".into(), "S2".into()],
            vec![],
            vec!["S2".into()],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "S2 is marked both present and late");

        let edits = status_edits(vec!["S1".into(), "S1".into()], vec!["S2".into()], vec![]).unwrap();
        assert_eq!(
            edits,
            vec![
                ("S1".to_string(), AttendanceStatus::Present),
                ("S2".to_string(), AttendanceStatus::Absent),
            ]
        );
    }

    #[test]
    fn bad_date_rejected() {
        assert!(Cli::try_parse_from(["rollcall", "attendance", "show", "--date", "05/01/2024"]).is_err());
    }
}
