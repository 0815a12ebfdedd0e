use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;
use valuer::calculators::construction::parse_schedule_csv;
use valuer::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Construction Cost Calculator",
    about = "Run the valuation platform's construction cost calculator service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect admin rate-schedule data
    Rates {
        #[command(subcommand)]
        command: RatesCommand,
    },
    /// Run an end-to-end CLI demo of a construction calculation
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RatesCommand {
    /// Parse a schedule CSV export and summarize its rows per kind
    Check(RatesCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the rate schedule from a CSV export at startup
    #[arg(long)]
    pub(crate) rates: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RatesCheckArgs {
    /// Path to the schedule CSV export
    #[arg(long)]
    file: PathBuf,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rates {
            command: RatesCommand::Check(args),
        } => run_rates_check(args),
        Command::Demo(args) => run_demo(args),
    }
}

fn run_rates_check(args: RatesCheckArgs) -> Result<(), AppError> {
    let rows = parse_schedule_csv(File::open(&args.file)?)?;

    let mut per_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for row in &rows {
        let label = row.kind.map(|kind| kind.label()).unwrap_or("(all kinds)");
        *per_kind.entry(label).or_insert(0) += 1;
    }

    println!("{} schedule row(s) in {}", rows.len(), args.file.display());
    for (label, count) in per_kind {
        println!("  {label:<40} {count}");
    }

    Ok(())
}
