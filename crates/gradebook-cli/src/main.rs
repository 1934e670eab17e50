//! Gradebook CLI - a command-line client for the school grading API.
//!
//! Lists the cached collections, the filtered grade view and the aggregate
//! report, and runs create/update/delete through the same stores a UI
//! would use.

use std::io;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gradebook_core::models::{
    DepartmentPayload, ExamPayload, GradePayload, GradeQuery, GradeUpdatePayload, StudentPayload,
};
use gradebook_core::utils::{clip, contains_ignore_case, text_or};
use gradebook_core::{ApiClient, Config, StoreRegistry};

const USAGE: &str = "\
Usage: gradebook <command> [args]

Commands:
  students | departments | exams     List a collection (--search TEXT on students)
  grades [--student ID] [--exam ID]  List grades, optionally filtered
  report                             Show the aggregate report
  preload                            Load every collection and the report
  create <kind> <json>               Create a student, department, exam or grade
  update <kind> <id> <json>          Update a record (grade id: STUDENT/EXAM)
  delete <kind> <id>                 Delete a record
  config [set-url URL | set-timeout SECS]

Options:
  --json      Print records as JSON
  --refresh   Bypass the cache on the first fetch

Environment:
  GRADEBOOK_API_BASE_URL, GRADEBOOK_TIMEOUT_SECS, RUST_LOG";

/// Maximum width of free-text columns
const NAME_COLUMN_WIDTH: usize = 32;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Parsed command line: positional words plus the global switches.
struct Args {
    words: Vec<String>,
    json: bool,
    refresh: bool,
    student: Option<i64>,
    exam: Option<i64>,
    search: Option<String>,
}

impl Args {
    fn parse(mut raw: impl Iterator<Item = String>) -> Result<Self> {
        let mut args = Args {
            words: Vec::new(),
            json: false,
            refresh: false,
            student: None,
            exam: None,
            search: None,
        };
        while let Some(arg) = raw.next() {
            match arg.as_str() {
                "--json" => args.json = true,
                "--refresh" => args.refresh = true,
                "--student" => args.student = Some(parse_id(raw.next(), "--student")?),
                "--exam" => args.exam = Some(parse_id(raw.next(), "--exam")?),
                "--search" => {
                    args.search = Some(raw.next().ok_or_else(|| anyhow!("--search needs a value"))?)
                }
                _ => args.words.push(arg),
            }
        }
        Ok(args)
    }

    fn word(&self, index: usize, what: &str) -> Result<&str> {
        self.words
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("Missing {}\n\n{}", what, USAGE))
    }
}

fn parse_id(value: Option<String>, what: &str) -> Result<i64> {
    let value = value.ok_or_else(|| anyhow!("{} needs a value", what))?;
    value
        .parse()
        .with_context(|| format!("Invalid {}: {}", what, value))
}

/// Parse a grade key written as `STUDENT/EXAM`.
fn parse_grade_key(value: &str) -> Result<(i64, i64)> {
    let (student, exam) = value
        .split_once('/')
        .ok_or_else(|| anyhow!("Grade id must look like STUDENT/EXAM, got {}", value))?;
    Ok((
        parse_id(Some(student.to_string()), "student id")?,
        parse_id(Some(exam.to_string()), "exam id")?,
    ))
}

fn parse_payload<T: serde::de::DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).with_context(|| format!("Invalid JSON payload: {}", json))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args = Args::parse(std::env::args().skip(1))?;
    let Some(command) = args.words.first().cloned() else {
        println!("{}", USAGE);
        return Ok(());
    };

    if command == "config" {
        return run_config(&args);
    }

    let config = Config::load()?;
    let client = ApiClient::from_config(&config)?;
    info!(base_url = client.base_url(), "Gradebook CLI starting");
    let registry = StoreRegistry::new(client);

    match command.as_str() {
        "students" | "departments" | "exams" => list_collection(&registry, &command, &args).await,
        "grades" => list_grades(&registry, &args).await,
        "report" => show_report(&registry, &args).await,
        "preload" => {
            let failures = registry.preload(args.refresh).await;
            if failures.is_empty() {
                println!("All collections loaded.");
                Ok(())
            } else {
                for failure in &failures {
                    eprintln!("✗ {}", failure);
                }
                bail!("{} of 4 loads failed", failures.len())
            }
        }
        "create" => create(&registry, &args).await,
        "update" => update(&registry, &args).await,
        "delete" => delete(&registry, &args).await,
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}

fn run_config(args: &Args) -> Result<()> {
    let mut config = Config::load()?;
    match args.words.get(1).map(String::as_str) {
        None => {
            println!("Config file: {}", Config::config_path()?.display());
            println!("API base URL: {}", config.api_base_url());
            println!("Timeout: {}s", config.request_timeout().as_secs());
            Ok(())
        }
        Some("set-url") => {
            config.api_base_url = Some(args.word(2, "URL")?.to_string());
            config.save()?;
            println!("Saved API base URL.");
            Ok(())
        }
        Some("set-timeout") => {
            let secs = args.word(2, "SECS")?;
            config.timeout_secs = Some(
                secs.parse()
                    .with_context(|| format!("Invalid timeout: {}", secs))?,
            );
            config.save()?;
            println!("Saved request timeout.");
            Ok(())
        }
        Some(other) => bail!("Unknown config action: {}", other),
    }
}

async fn list_collection(registry: &StoreRegistry, kind: &str, args: &Args) -> Result<()> {
    match kind {
        "students" => {
            let store = registry.students();
            store.fetch(args.refresh).await?;
            let students = match &args.search {
                Some(text) => store.filter(|s| {
                    contains_ignore_case(&s.name, text) || s.ra.contains(text.as_str())
                }),
                None => store.items(),
            };
            if args.json {
                return print_json(&students);
            }
            for s in &students {
                println!(
                    "{:>5}  {:<10}  {:<w$}  {}",
                    s.id,
                    s.ra,
                    clip(&s.name, NAME_COLUMN_WIDTH),
                    s.display_email(),
                    w = NAME_COLUMN_WIDTH
                );
            }
            eprintln!(
                "{} of {} students (fetched {})",
                students.len(),
                store.total(),
                store.age_display()
            );
        }
        "departments" => {
            let store = registry.departments();
            store.fetch(args.refresh).await?;
            if args.json {
                return print_json(&store.items());
            }
            for d in store.items() {
                println!("{:>5}  {:<8}  {}", d.id, d.display_code(), d.name);
            }
            eprintln!("{} departments (fetched {})", store.total(), store.age_display());
        }
        _ => {
            let store = registry.exams();
            store.fetch(args.refresh).await?;
            if args.json {
                return print_json(&store.items());
            }

            // Department labels are best effort
            let departments = registry.departments();
            let _ = departments.fetch(false).await;

            for e in store.items() {
                let department = departments
                    .find(&e.department_id)
                    .map(|d| d.label())
                    .unwrap_or_else(|| format!("#{}", e.department_id));
                println!(
                    "{:>5}  {}  {:<w$}  {:<w$}  {}",
                    e.id,
                    e.date_display(),
                    clip(&e.title, NAME_COLUMN_WIDTH),
                    clip(&department, NAME_COLUMN_WIDTH),
                    text_or(e.description.as_deref(), ""),
                    w = NAME_COLUMN_WIDTH
                );
            }
            eprintln!("{} exams (fetched {})", store.total(), store.age_display());
        }
    }
    Ok(())
}

async fn list_grades(registry: &StoreRegistry, args: &Args) -> Result<()> {
    let filters = GradeQuery {
        student_id: args.student,
        exam_id: args.exam,
    };
    let grades = registry.grades();
    grades.fetch(filters, args.refresh).await?;
    if args.json {
        return print_json(&grades.items());
    }

    // Names are best effort
    let students = registry.students();
    let exams = registry.exams();
    let _ = tokio::join!(students.fetch(false), exams.fetch(false));

    for g in grades.items() {
        let student = students
            .find(&g.student_id)
            .map(|s| s.name)
            .unwrap_or_else(|| format!("#{}", g.student_id));
        let exam = exams
            .find(&g.exam_id)
            .map(|e| e.title)
            .unwrap_or_else(|| format!("#{}", g.exam_id));
        println!(
            "{:<w$}  {:<w$}  {:>5}  {}",
            clip(&student, NAME_COLUMN_WIDTH),
            clip(&exam, NAME_COLUMN_WIDTH),
            g.display_value(),
            text_or(g.note.as_deref(), ""),
            w = NAME_COLUMN_WIDTH
        );
    }
    if filters.is_empty() {
        eprintln!("{} grades", grades.total());
    } else {
        eprintln!("{} grades matching the filters", grades.total());
    }
    Ok(())
}

async fn show_report(registry: &StoreRegistry, args: &Args) -> Result<()> {
    let report = registry.report();
    report.fetch(args.refresh).await?;
    if args.json {
        return print_json(&report.report());
    }

    println!("Department ranking");
    for (rank, d) in report.department_ranking().iter().enumerate() {
        println!(
            "{:>3}. {:<w$}  mean {:>5}  range {}",
            rank + 1,
            clip(&d.department_name, NAME_COLUMN_WIDTH),
            d.mean_display(),
            d.range_display(),
            w = NAME_COLUMN_WIDTH
        );
    }

    println!("\nStudents assessed by exams and projects");
    for m in report.modality_balance() {
        println!(
            "{:<10}  {:<w$}  exams {:>3}  projects {:>3}",
            m.ra,
            clip(&m.name, NAME_COLUMN_WIDTH),
            m.exam_assessments.unwrap_or(0),
            m.projects_delivered.unwrap_or(0),
            w = NAME_COLUMN_WIDTH
        );
    }

    println!("\nGrade coverage");
    for c in report.grade_coverage() {
        let marker = if c.has_grades() { " " } else { "!" };
        println!(
            "{} {:<10}  {:<w$}  exams {:>3}  mean {}",
            marker,
            c.ra,
            clip(&c.name, NAME_COLUMN_WIDTH),
            c.exams_assessed.unwrap_or(0),
            c.mean_display(),
            w = NAME_COLUMN_WIDTH
        );
    }
    Ok(())
}

async fn create(registry: &StoreRegistry, args: &Args) -> Result<()> {
    let kind = args.word(1, "kind")?;
    let json = args.word(2, "JSON payload")?;
    match kind {
        "student" => {
            let created = registry
                .students()
                .create(parse_payload::<StudentPayload>(json)?)
                .await?;
            print_json(&created)
        }
        "department" => {
            let created = registry
                .departments()
                .create(parse_payload::<DepartmentPayload>(json)?)
                .await?;
            print_json(&created)
        }
        "exam" => {
            let created = registry
                .exams()
                .create(parse_payload::<ExamPayload>(json)?)
                .await?;
            print_json(&created)
        }
        "grade" => {
            let created = registry
                .grades()
                .create(parse_payload::<GradePayload>(json)?)
                .await?;
            print_json(&created)
        }
        other => bail!("Unknown kind: {}", other),
    }
}

async fn update(registry: &StoreRegistry, args: &Args) -> Result<()> {
    let kind = args.word(1, "kind")?;
    let id = args.word(2, "id")?;
    let json = args.word(3, "JSON payload")?;
    match kind {
        "student" => {
            let updated = registry
                .students()
                .update(parse_id(Some(id.to_string()), "id")?, parse_payload(json)?)
                .await?;
            print_json(&updated)
        }
        "department" => {
            let updated = registry
                .departments()
                .update(parse_id(Some(id.to_string()), "id")?, parse_payload(json)?)
                .await?;
            print_json(&updated)
        }
        "exam" => {
            let updated = registry
                .exams()
                .update(parse_id(Some(id.to_string()), "id")?, parse_payload(json)?)
                .await?;
            print_json(&updated)
        }
        "grade" => {
            let (student_id, exam_id) = parse_grade_key(id)?;
            let updated = registry
                .grades()
                .update(student_id, exam_id, parse_payload::<GradeUpdatePayload>(json)?)
                .await?;
            print_json(&updated)
        }
        other => bail!("Unknown kind: {}", other),
    }
}

async fn delete(registry: &StoreRegistry, args: &Args) -> Result<()> {
    let kind = args.word(1, "kind")?;
    let id = args.word(2, "id")?;
    match kind {
        "student" => registry.students().remove(parse_id(Some(id.to_string()), "id")?).await?,
        "department" => {
            registry
                .departments()
                .remove(parse_id(Some(id.to_string()), "id")?)
                .await?
        }
        "exam" => registry.exams().remove(parse_id(Some(id.to_string()), "id")?).await?,
        "grade" => {
            let (student_id, exam_id) = parse_grade_key(id)?;
            registry.grades().remove(student_id, exam_id).await?
        }
        other => bail!("Unknown kind: {}", other),
    }
    println!("Deleted {} {}.", kind, id);
    Ok(())
}
