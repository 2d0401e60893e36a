use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::cli::commands::*;
use crate::cli::output::format_stats_report;
use crate::io::config_io;
use crate::io::paths;
use crate::io::record_store::RecordStore;
use crate::model::attendance::{DATE_FORMAT_HINT, parse_date};
use crate::model::config::AttendConfig;
use crate::model::schedule::ScheduleProvider;
use crate::ops::day_state::DayState;
use crate::ops::stats;
use crate::tui::{self, Outcome};

/// Resolved file locations for this run
pub struct Locations {
    pub config: PathBuf,
    pub data_file: PathBuf,
}

impl Locations {
    pub fn from_cli(cli: &Cli) -> Self {
        Locations {
            config: cli
                .config
                .clone()
                .unwrap_or_else(paths::default_config_path),
            data_file: cli
                .data_file
                .clone()
                .unwrap_or_else(paths::default_data_path),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let locations = Locations::from_cli(&cli);

    match cli.command {
        None => cmd_open(cli.date.as_deref(), &locations),
        Some(Commands::Stats(args)) => cmd_stats(args, &locations),
        Some(Commands::Rename(args)) => cmd_rename(args, &locations),
        Some(Commands::ConfigFile) => cmd_config_file(&locations),
    }
}

fn load_config(locations: &Locations) -> Result<AttendConfig, Box<dyn std::error::Error>> {
    Ok(config_io::read_config(&locations.config)?)
}

/// Parse a user-supplied date, naming the flag or argument it came from
fn parse_date_arg(value: &str, what: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| {
        format!(
            "invalid {} '{}': expected {}",
            what, value, DATE_FORMAT_HINT
        )
    })
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_open(date: Option<&str>, locations: &Locations) -> Result<(), Box<dyn std::error::Error>> {
    let today = Local::now().date_naive();
    let date = match date {
        Some(value) => parse_date_arg(value, "date")?,
        None => today,
    };

    let config = load_config(locations)?;
    let mut store = RecordStore::open(&locations.data_file, &config);
    let state = DayState::initialize(
        date,
        today,
        config.unscheduled_as_cancelled,
        &mut store,
        &config,
    )?;

    tracing::info!(%date, data_file = %locations.data_file.display(), "opening session");
    match tui::run(state, &mut store, &config)? {
        Outcome::Saved => println!("Saved successfully"),
        Outcome::Cancelled => println!("Cancelled"),
    }
    Ok(())
}

fn cmd_stats(args: StatsArgs, locations: &Locations) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(locations)?;
    let start = match args.start.as_deref() {
        Some(value) => Some(parse_date_arg(value, "--start")?),
        None => config.start_date(),
    };
    let end = args
        .end
        .as_deref()
        .map(|value| parse_date_arg(value, "--end"))
        .transpose()?;
    if let (Some(s), Some(e)) = (start, end)
        && s > e
    {
        return Err(format!("--start {} is after --end {}", s, e).into());
    }

    let mut store = RecordStore::open(&locations.data_file, &config);
    let records = store.records_in_range(start, end)?;
    let report = if args.weekday {
        stats::weekday_stats(&records)
    } else {
        stats::subject_stats(&records)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_empty() {
        println!("No attendance records found");
    } else {
        println!("{}", format_stats_report(&report));
    }
    Ok(())
}

fn cmd_rename(args: RenameArgs, locations: &Locations) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(locations)?;
    let mut store = RecordStore::open(&locations.data_file, &config);
    store.rename_subject(&args.old, &args.new)?;

    println!("Renamed '{}' to '{}'", args.old, args.new.trim());
    if config.all_known_subjects().contains(args.old.as_str()) {
        println!(
            "'{}' is still in the schedule; update {}",
            args.old,
            locations.config.display()
        );
    }
    Ok(())
}

fn cmd_config_file(locations: &Locations) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", locations.config.display());
    Ok(())
}
