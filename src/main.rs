//! Ordersheet CLI: save user order data, check status, export reports

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::Colorize;
use ordersheet::audit::{AuditEntry, AuditLog};
use ordersheet::report::ReportBuilder;
use ordersheet::storage::{NoteStore, SaveOutcome, UserStatus};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

/// Ordersheet: multi-user order entry and Excel export
#[derive(Parser, Debug)]
#[command(name = "ordersheet")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the per-user JSON documents
    #[arg(long, global = true, default_value = "shared_notes")]
    data_dir: PathBuf,

    /// Path of the export audit log
    #[arg(long, global = true, default_value = "logs/export_logs.csv")]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate and store a user's JSON order list
    Save {
        /// User the document belongs to
        user: String,

        /// Read the JSON text from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show which users have data ready to export
    Status {
        /// Users to check (default: every user with a stored document)
        users: Vec<String>,
    },

    /// Merge the selected users' data into an XLSX report
    Export {
        /// Users whose data to include, in filename order
        #[arg(required = true)]
        users: Vec<String>,

        /// Directory to write the report into
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Name recorded in the audit log
        #[arg(long, default_value = "Admin")]
        operator: String,
    },

    /// Print the export history
    Log,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        Commands::Save { user, file } => run_save(&args.data_dir, &user, file.as_deref()),
        Commands::Status { users } => run_status(&args.data_dir, &users),
        Commands::Export {
            users,
            out,
            operator,
        } => run_export(&args.data_dir, &args.log_file, &users, &out, &operator),
        Commands::Log => run_log(&args.log_file),
    }
}

fn run_save(data_dir: &std::path::Path, user: &str, file: Option<&std::path::Path>) -> Result<ExitCode> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read JSON from stdin")?;
            buffer
        }
    };

    let store = NoteStore::new(data_dir)?;
    match store.save(user, &text)? {
        SaveOutcome::Saved { records } => {
            println!(
                "{} Saved {} record{} for {}",
                "✓".green(),
                records,
                if records == 1 { "" } else { "s" },
                user
            );
        }
        SaveOutcome::Cleared => {
            eprintln!(
                "{}: empty input, cleared all data for {}",
                "Warning".yellow(),
                user
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_status(data_dir: &std::path::Path, users: &[String]) -> Result<ExitCode> {
    let store = NoteStore::new(data_dir)?;
    let users = if users.is_empty() {
        store.known_users()?
    } else {
        users.to_vec()
    };
    if users.is_empty() {
        println!("No user documents yet");
        return Ok(ExitCode::SUCCESS);
    }

    for user in &users {
        match store.status(user) {
            UserStatus::Ready { records } => {
                println!(
                    "{} {}: {} record{}",
                    "●".green(),
                    user,
                    records,
                    if records == 1 { "" } else { "s" }
                );
            }
            UserStatus::Empty => println!("{} {}: no records", "●".yellow(), user),
            UserStatus::Missing => println!("{} {}: no document", "●".red(), user),
            UserStatus::Unreadable => println!("{} {}: unreadable document", "●".red(), user),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_export(
    data_dir: &std::path::Path,
    log_file: &std::path::Path,
    users: &[String],
    out: &std::path::Path,
    operator: &str,
) -> Result<ExitCode> {
    let store = NoteStore::new(data_dir)?;
    let mut combined = Vec::new();
    for user in users {
        combined.extend(store.load(user)?);
    }

    if combined.is_empty() {
        eprintln!("{}: no data to export", "Warning".yellow());
        return Ok(ExitCode::from(1));
    }

    let now = Local::now();
    let (mut workbook, totals) = ReportBuilder::new()
        .with_date(now.date_naive())
        .build(&combined)?;

    let file_name = format!(
        "{}_TOTAL_SHIRT_{}_TOTAL_FILMS_{}.xlsx",
        users.join("_"),
        totals.shirts,
        totals.films
    );
    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory {}", out.display()))?;
    let path = out.join(&file_name);
    workbook
        .save(&path)
        .with_context(|| format!("Failed to save {}", path.display()))?;

    let log = AuditLog::new(log_file);
    log.record(&AuditEntry {
        user: operator.to_string(),
        file_name,
        total_shirt: totals.shirts,
        total_films: totals.films,
        timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
    })?;

    println!(
        "{} Exported {} ({} shirts, {} films)",
        "✓".green(),
        path.display(),
        totals.shirts,
        totals.films
    );
    Ok(ExitCode::SUCCESS)
}

fn run_log(log_file: &std::path::Path) -> Result<ExitCode> {
    let log = AuditLog::new(log_file);
    let entries = log.entries()?;
    if entries.is_empty() {
        println!("No exports recorded yet");
        return Ok(ExitCode::SUCCESS);
    }

    for entry in &entries {
        println!(
            "{}  {:<12} shirts={:<5} films={:<5} {}",
            entry.timestamp, entry.user, entry.total_shirt, entry.total_films, entry.file_name
        );
    }
    Ok(ExitCode::SUCCESS)
}
