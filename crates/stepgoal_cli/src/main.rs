//! Command-line driver for the StepGoal core.
//!
//! # Responsibility
//! - Drive tracker and scan routing against a SQLite preference file.
//! - Print the resulting snapshot as text or JSON.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use stepgoal_core::db::open_db;
use stepgoal_core::{
    route_scan_results, ContactInfo, DisplaySnapshot, NoBrowser, OpenError, ScanReport,
    ScannedCode, SensorMode, SensorReading, SqlitePreferenceStore, StepGoalTracker, UrlOpener,
    DEFAULT_NAMESPACE,
};

const DEFAULT_DB_FILE: &str = "step_tracker.sqlite3";

#[derive(Parser, Debug)]
#[command(name = "stepgoal", version, about = "Step goal tracker CLI")]
struct Cli {
    #[arg(long, global = true, env = "STEPGOAL_DB_PATH", help = "Preference database file")]
    db: Option<PathBuf>,
    #[arg(long, global = true, default_value = DEFAULT_NAMESPACE, help = "Preference namespace")]
    namespace: String,
    #[arg(long, global = true, value_enum, default_value_t = ModeArg::Raw)]
    mode: ModeArg,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[arg(long, global = true, help = "Absolute directory for rolling log files")]
    log_dir: Option<String>,
    #[arg(long, global = true, help = "Log level (trace|debug|info|warn|error)")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the current snapshot.
    Status,
    /// Apply a cumulative step-counter reading.
    Sensor { steps: f32 },
    /// Set the goal from text input; invalid input is ignored.
    Goal { text: String },
    /// Run the daily rollover (defaults to today's local date).
    Rollover {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Zero the step count.
    Clear,
    /// Route one scanned code and print its display strings.
    Scan {
        #[arg(long = "type", value_enum)]
        value_type: ScanTypeArg,
        payload: Option<String>,
        #[arg(long, help = "Report URLs as opened instead of printing no-handler")]
        open: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Raw,
    DailyBaseline,
}

impl From<ModeArg> for SensorMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Raw => SensorMode::Raw,
            ModeArg::DailyBaseline => SensorMode::DailyBaseline,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScanTypeArg {
    Url,
    Contact,
    Other,
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    applied: bool,
    message: &'a str,
    snapshot: DisplaySnapshot,
}

/// Prints URLs it is asked to open; the CLI has no browser of its own.
struct PrintingOpener;

impl UrlOpener for PrintingOpener {
    fn open(&mut self, url: &str) -> Result<(), OpenError> {
        eprintln!("open {url}");
        Ok(())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or(stepgoal_core::default_log_level());
        if let Err(err) = stepgoal_core::init_logging(level, log_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    let command = command_name(&cli.command);
    match run(&cli) {
        Ok(()) => {
            info!("event=cli_command module=cli status=ok command={command}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(
                "event=cli_command module=cli status=error command={} error={}",
                command, err
            );
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    match &cli.command {
        Commands::Status => with_tracker(cli, |tracker| (true, "ok", tracker.snapshot())),
        Commands::Sensor { steps } => with_tracker(cli, |tracker| {
            match SensorReading::from_raw(*steps) {
                Some(reading) => (
                    true,
                    "reading applied",
                    tracker.on_sensor_reading(reading.cumulative_steps),
                ),
                None => (false, "reading rejected", tracker.snapshot()),
            }
        }),
        Commands::Goal { text } => with_tracker(cli, |tracker| {
            match tracker.set_goal(text.as_str()) {
                Some(snapshot) => (true, "goal updated", snapshot),
                None => (false, "goal unchanged", tracker.snapshot()),
            }
        }),
        Commands::Rollover { date } => with_tracker(cli, |tracker| {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            if tracker.on_daily_rollover(today) {
                (true, "step count reset", tracker.snapshot())
            } else {
                (false, "already reset today", tracker.snapshot())
            }
        }),
        Commands::Clear => with_tracker(cli, |tracker| {
            (true, "step count cleared", tracker.clear_step_count())
        }),
        Commands::Scan {
            value_type,
            payload,
            open,
        } => {
            let code = scanned_code(*value_type, payload.clone());
            let report = if *open {
                route_scan_results(&[code], &mut PrintingOpener)
            } else {
                route_scan_results(&[code], &mut NoBrowser)
            };
            print_scan(cli.json, &report)
        }
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Status => "status",
        Commands::Sensor { .. } => "sensor",
        Commands::Goal { .. } => "goal",
        Commands::Rollover { .. } => "rollover",
        Commands::Clear => "clear",
        Commands::Scan { .. } => "scan",
    }
}

fn with_tracker(
    cli: &Cli,
    apply: impl FnOnce(
        &mut StepGoalTracker<SqlitePreferenceStore<'_>>,
    ) -> (bool, &'static str, DisplaySnapshot),
) -> Result<(), String> {
    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));
    let conn = open_db(&db_path).map_err(|err| format!("open {}: {err}", db_path.display()))?;
    let store = SqlitePreferenceStore::new(&conn, cli.namespace.as_str());
    let mut tracker = StepGoalTracker::load_with_mode(store, cli.mode.into());

    let (applied, message, snapshot) = apply(&mut tracker);
    print_status(
        cli.json,
        &StatusOutput {
            applied,
            message,
            snapshot,
        },
    )
}

fn scanned_code(value_type: ScanTypeArg, payload: Option<String>) -> ScannedCode {
    match value_type {
        ScanTypeArg::Url => ScannedCode::Url { url: payload },
        ScanTypeArg::Contact => ScannedCode::ContactInfo {
            contact: payload.map(|name| ContactInfo {
                name: Some(name),
                ..ContactInfo::default()
            }),
        },
        ScanTypeArg::Other => ScannedCode::Other { raw_value: payload },
    }
}

fn print_status(json: bool, output: &StatusOutput<'_>) -> Result<(), String> {
    if json {
        let text = serde_json::to_string_pretty(output).map_err(|err| err.to_string())?;
        println!("{text}");
        return Ok(());
    }

    println!("{}", output.snapshot.step_line());
    println!("{}", output.snapshot.progress_line());
    println!("Badge: {}", output.snapshot.badge.as_str());
    if !output.applied {
        println!("({})", output.message);
    }
    Ok(())
}

fn print_scan(json: bool, report: &ScanReport) -> Result<(), String> {
    if json {
        let text = serde_json::to_string_pretty(report).map_err(|err| err.to_string())?;
        println!("{text}");
        return Ok(());
    }

    match &report.display {
        Some(display) => {
            println!("Type: {}", display.type_label);
            println!("Content: {}", display.content);
        }
        None => println!("Nothing to display"),
    }
    Ok(())
}
