use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use boq_planner::workbook::{load_table, write_plan};
use boq_planner::{plan, Overlay, PlanOptions, PlanSummary};

/// Derive a resourced, scheduled and costed plan from a BOQ spreadsheet.
#[derive(Debug, Parser)]
#[command(name = "boq-planner", version, about)]
struct Cli {
    /// BOQ file (.xlsx, .xls, .ods or .csv)
    input: PathBuf,

    /// Worksheet to read (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Profit margin in percent; requires --start-date
    #[arg(long, allow_hyphen_values = true, requires = "start_date")]
    margin: Option<f64>,

    /// Project start date (YYYY-MM-DD); requires --margin
    #[arg(long, requires = "margin")]
    start_date: Option<NaiveDate>,

    /// Write the multi-sheet plan workbook here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let overlay = match (cli.margin, cli.start_date) {
        (Some(margin_percent), Some(start_date)) => Some(Overlay {
            margin_percent,
            start_date,
        }),
        (None, None) => None,
        _ => bail!("--margin and --start-date must be given together"),
    };

    let raw = load_table(&cli.input, cli.sheet.as_deref())
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    let project = plan(raw, &PlanOptions { overlay })?;

    let summary = PlanSummary::from_plan(&project)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }

    if let Some(path) = &cli.output {
        write_plan(&project, path)?;
        info!(path = %path.display(), "export complete");
    }
    Ok(())
}
