//! `slotgrid` CLI: build appointment availability grids from a record-store
//! document.
//!
//! ## Usage
//!
//! ```sh
//! # Slot table for one professional over a week
//! slotgrid grid --store data.json --professional 7 --from 2026-03-16 --to 2026-03-20
//!
//! # Same grid with a per-query policy tweak, as JSON
//! slotgrid grid --store data.json -p 7 --from 2026-03-16 --to 2026-03-20 \
//!     --slot 45 --buffer 15 --no-lunch --format json
//!
//! # Per-day occupancy
//! slotgrid summary --store data.json -p 7 --from 2026-03-01 --to 2026-03-31
//!
//! # Write both CSV exports into a directory
//! slotgrid export --store data.json -p 7 --from 2026-03-01 --to 2026-03-31 --dir out --bom
//! ```
//!
//! Logging goes to stderr; set `RUST_LOG` or `--log-level` (default `warn`).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use slot_engine::calendar::parse_clock;
use slot_engine::export::{
    slots_file_name, summary_file_name, write_slots_csv, write_summary_csv, CsvOptions,
};
use slot_engine::{
    build_grid_with_report, load_grid_inputs, summarize_by_day, summarize_period, DaySummary,
    GridOverrides, Locale, LunchBreak, MemoryStore, QueryWindow, Slot,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slotgrid",
    version,
    about = "Appointment availability grid builder"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter, e.g. "debug" or "slot_engine=trace" (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the slot grid
    Grid {
        #[command(flatten)]
        query: QueryArgs,
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the per-day occupancy summary
    Summary {
        #[command(flatten)]
        query: QueryArgs,
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the slot CSV and the summary CSV into a directory
    Export {
        #[command(flatten)]
        query: QueryArgs,
        /// Target directory (created if missing)
        #[arg(short, long)]
        dir: PathBuf,
        /// Prefix each file with a UTF-8 byte-order mark
        #[arg(long)]
        bom: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

#[derive(Args)]
struct QueryArgs {
    /// Record-store JSON document
    #[arg(short, long)]
    store: PathBuf,
    /// Professional id
    #[arg(short, long)]
    professional: String,
    /// First day of the window (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,
    /// Last day of the window, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: NaiveDate,

    /// Workday start (HH:MM), overrides the stored policy
    #[arg(long, value_parser = clock)]
    workday_start: Option<NaiveTime>,
    /// Workday end (HH:MM), overrides the stored policy
    #[arg(long, value_parser = clock)]
    workday_end: Option<NaiveTime>,
    /// Slot length in minutes
    #[arg(long, allow_negative_numbers = true)]
    slot: Option<i64>,
    /// Gap after each slot in minutes
    #[arg(long, allow_negative_numbers = true)]
    buffer: Option<i64>,
    /// Simultaneous appointments per slot
    #[arg(long)]
    capacity: Option<u32>,
    /// Lunch start (HH:MM)
    #[arg(long, value_parser = clock, requires = "lunch_end")]
    lunch_start: Option<NaiveTime>,
    /// Lunch end (HH:MM)
    #[arg(long, value_parser = clock, requires = "lunch_start")]
    lunch_end: Option<NaiveTime>,
    /// Ignore the stored lunch break
    #[arg(long, conflicts_with_all = ["lunch_start", "lunch_end"])]
    no_lunch: bool,
    /// Skip fixed national holidays
    #[arg(long, conflicts_with = "no_holidays")]
    holidays: bool,
    /// Do not skip holidays even if the professional observes them
    #[arg(long)]
    no_holidays: bool,
    /// Weekday name language (en, pt-BR)
    #[arg(long)]
    locale: Option<Locale>,

    /// Move the window start forward to this date ("today" or YYYY-MM-DD)
    #[arg(long)]
    not_before: Option<String>,
    /// IANA timezone used to resolve "today"
    #[arg(long, default_value = "UTC")]
    timezone: String,
    /// Longest window accepted, in days
    #[arg(long, default_value_t = 731)]
    max_days: i64,
}

fn clock(raw: &str) -> std::result::Result<NaiveTime, String> {
    parse_clock(raw).ok_or_else(|| format!("invalid time '{}', expected HH:MM", raw))
}

impl QueryArgs {
    fn overrides(&self) -> GridOverrides {
        let lunch = match (self.no_lunch, self.lunch_start, self.lunch_end) {
            (true, _, _) => Some(None),
            (false, Some(start), Some(end)) => Some(Some(LunchBreak::new(start, end))),
            _ => None,
        };
        let observe_holidays = if self.holidays {
            Some(true)
        } else if self.no_holidays {
            Some(false)
        } else {
            None
        };
        GridOverrides {
            workday_start: self.workday_start,
            workday_end: self.workday_end,
            slot_minutes: self.slot,
            buffer_minutes: self.buffer,
            capacity: self.capacity,
            lunch,
            observe_holidays,
            locale: self.locale,
        }
    }

    fn window(&self) -> Result<QueryWindow> {
        let mut window =
            QueryWindow::new(self.from, self.to).context("Invalid --from/--to window")?;
        if let Some(raw) = self.not_before.as_deref() {
            let floor = resolve_date(raw, &self.timezone)?;
            window = window.clamp_not_before(floor);
            tracing::debug!(start = %window.start, end = %window.end, "window clamped");
        }
        if window.len_days() > self.max_days {
            bail!(
                "Window spans {} days, more than the limit of {} (raise --max-days)",
                window.len_days(),
                self.max_days
            );
        }
        Ok(window)
    }
}

/// Parse `"today"` in `timezone`, or a literal date.
fn resolve_date(raw: &str, timezone: &str) -> Result<NaiveDate> {
    if raw.eq_ignore_ascii_case("today") {
        let tz: chrono_tz::Tz = timezone
            .parse()
            .map_err(|_| anyhow!("Invalid timezone: {}", timezone))?;
        return Ok(Utc::now().with_timezone(&tz).date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid --not-before date: {}", raw))
}

/// A built grid plus the window it covers.
struct Built {
    window: QueryWindow,
    professional_id: String,
    slots: Vec<Slot>,
}

fn build(query: &QueryArgs) -> Result<Built> {
    let store = MemoryStore::from_path(&query.store)
        .with_context(|| format!("Failed to load store: {}", query.store.display()))?;
    let inputs = load_grid_inputs(&store, &query.professional)
        .with_context(|| format!("Failed to load professional {}", query.professional))?;

    let overrides = query.overrides();
    let policy = inputs.policy.with_overrides(&overrides);
    let window = query.window()?;

    let report = build_grid_with_report(
        &inputs.appointments,
        &policy,
        &inputs.professional_id,
        &window,
        policy.observe_holidays,
    )
    .context("Failed to build availability grid")?;

    let malformed = inputs.rejected.len()
        + report
            .skipped
            .iter()
            .filter(|s| s.reason.is_malformed())
            .count();
    if malformed > 0 {
        tracing::warn!(malformed, "some appointment rows could not be read and were ignored");
    }

    Ok(Built {
        window,
        professional_id: inputs.professional_id,
        slots: report.slots,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Grid {
            query,
            format,
            output,
        } => {
            let built = build(&query)?;
            let rendered = match format {
                Format::Table => render_slot_table(&built.slots),
                Format::Json => render_grid_json(&built)?,
                Format::Csv => {
                    let mut buf = Vec::new();
                    write_slots_csv(&mut buf, &built.slots, CsvOptions::default())
                        .context("Failed to write CSV")?;
                    String::from_utf8(buf).context("CSV output is not UTF-8")?
                }
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Summary {
            query,
            format,
            output,
        } => {
            let built = build(&query)?;
            let days = summarize_by_day(&built.slots);
            let rendered = match format {
                Format::Table => render_summary_table(&built.slots, &days),
                Format::Json => {
                    let period = summarize_period(&built.slots);
                    let value = serde_json::json!({
                        "professional_id": built.professional_id,
                        "window": built.window,
                        "period": period,
                        "occupancy_rate": period.occupancy_rate(),
                        "days": days,
                    });
                    serde_json::to_string_pretty(&value)? + "\n"
                }
                Format::Csv => {
                    let mut buf = Vec::new();
                    write_summary_csv(&mut buf, &days, CsvOptions::default())
                        .context("Failed to write CSV")?;
                    String::from_utf8(buf).context("CSV output is not UTF-8")?
                }
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Export { query, dir, bom } => {
            let built = build(&query)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            let options = CsvOptions { bom };

            let slots_path = dir.join(slots_file_name(&built.window));
            let file = std::fs::File::create(&slots_path)
                .with_context(|| format!("Failed to write file: {}", slots_path.display()))?;
            write_slots_csv(file, &built.slots, options)
                .with_context(|| format!("Failed to write file: {}", slots_path.display()))?;

            let summary_path = dir.join(summary_file_name(&built.window));
            let file = std::fs::File::create(&summary_path)
                .with_context(|| format!("Failed to write file: {}", summary_path.display()))?;
            write_summary_csv(file, &summarize_by_day(&built.slots), options)
                .with_context(|| format!("Failed to write file: {}", summary_path.display()))?;

            println!("{}", slots_path.display());
            println!("{}", summary_path.display());
        }
    }

    Ok(())
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("Invalid log filter: {}", level))?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}

const EMPTY_GRID: &str = "No slots found for the configured period.\n";

fn render_slot_table(slots: &[Slot]) -> String {
    if slots.is_empty() {
        return EMPTY_GRID.to_string();
    }
    let period = summarize_period(slots);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Slots: {}  Available: {}  Occupied: {}",
        period.total, period.available, period.occupied
    );
    let _ = writeln!(
        out,
        "{:<10}  {:<9}  {:<13}  {:<9}  {:<20}  {:<10}  {}",
        "Date", "Weekday", "Time", "Status", "Client", "Appt", "Notes"
    );
    for slot in slots {
        let (client, status, notes) = match &slot.conflict {
            Some(c) => (c.client.as_str(), c.status.as_str(), c.notes.as_str()),
            None => ("", "", ""),
        };
        let line = format!(
            "{:<10}  {:<9}  {:<13}  {:<9}  {:<20}  {:<10}  {}",
            slot.date,
            slot.weekday_name,
            slot.time_range(),
            slot.status,
            client,
            status,
            notes
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

fn render_summary_table(slots: &[Slot], days: &[DaySummary]) -> String {
    if days.is_empty() {
        return EMPTY_GRID.to_string();
    }
    let period = summarize_period(slots);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:>5}  {:>9}  {:>8}  {:>7}",
        "Date", "Slots", "Available", "Occupied", "Rate %"
    );
    for day in days {
        let _ = writeln!(
            out,
            "{:<10}  {:>5}  {:>9}  {:>8}  {:>7.1}",
            day.date, day.total_slots, day.available, day.occupied, day.occupancy_rate
        );
    }
    let _ = writeln!(
        out,
        "{:<10}  {:>5}  {:>9}  {:>8}  {:>7.1}",
        "Total",
        period.total,
        period.available,
        period.occupied,
        period.occupancy_rate()
    );
    out
}

fn render_grid_json(built: &Built) -> Result<String> {
    let value = serde_json::json!({
        "professional_id": built.professional_id,
        "window": built.window,
        "summary": summarize_period(&built.slots),
        "slots": built.slots,
    });
    Ok(serde_json::to_string_pretty(&value)? + "\n")
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
