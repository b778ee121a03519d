//! Tabular format benchmark runner
//!
//! Usage:
//!   tabbench                              # every format, 3 repeats, 1M rows
//!   tabbench --formats csv,parquet        # benchmark a subset
//!   tabbench --skip xml --repeats 5       # skip a format
//!   tabbench --rows 100000 --export out/  # smaller dataset, CSV+JSON export

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tabbench::adapters::Format;
use tabbench::dataset::{self, DataGen};
use tabbench::harness::{self, BenchConfig};
use tabbench::report::{self, BenchSuite};
use tabbench::{BenchError, BenchResult, SystemInfo};

#[derive(Parser, Debug)]
#[command(name = "tabbench", about = "Tabular file-format benchmark suite")]
struct Cli {
    /// Rows in the generated dataset.
    #[arg(long, default_value_t = dataset::DEFAULT_ROWS)]
    rows: usize,

    /// Float64 columns in the generated dataset.
    #[arg(long, default_value_t = dataset::DEFAULT_COLS)]
    cols: usize,

    /// RNG seed for dataset generation.
    #[arg(long, default_value_t = dataset::DEFAULT_SEED)]
    seed: u64,

    /// Repetitions per format.
    #[arg(long, default_value_t = 3)]
    repeats: usize,

    /// Formats to benchmark (comma-separated). Defaults to every known
    /// format.
    #[arg(long, value_delimiter = ',')]
    formats: Vec<String>,

    /// Formats to skip (comma-separated).
    #[arg(long, value_delimiter = ',')]
    skip: Vec<String>,

    /// Working directory for temporary artifacts (defaults to the system
    /// temp dir).
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Export directory for CSV + JSON results.
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> BenchResult<()> {
    let cli = Cli::parse();

    // Unknown names fail here, before any data is generated.
    let mut formats: Vec<Format> = if cli.formats.is_empty() {
        Format::ALL.to_vec()
    } else {
        cli.formats
            .iter()
            .map(|s| s.parse())
            .collect::<BenchResult<_>>()?
    };
    let skip: Vec<Format> = cli
        .skip
        .iter()
        .map(|s| s.parse())
        .collect::<BenchResult<_>>()?;
    formats.retain(|f| !skip.contains(f));
    if formats.is_empty() {
        return Err(BenchError::Config(
            "no formats selected (check --skip flags)".into(),
        ));
    }

    println!(
        "\n{}",
        "╔══════════════════════════════════════════════════════╗"
            .bold()
            .blue()
    );
    println!(
        "{}",
        "║          Tabular Format Benchmark Suite              ║"
            .bold()
            .blue()
    );
    println!(
        "{}",
        "╚══════════════════════════════════════════════════════╝"
            .bold()
            .blue()
    );
    println!(
        "  Rows: {}  Cols: {}  Seed: {}  Repeats: {}",
        cli.rows, cli.cols, cli.seed, cli.repeats
    );
    println!(
        "  Formats: {}",
        formats
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let batch = DataGen::new(cli.seed).float_batch(cli.rows, cli.cols);

    let config = BenchConfig {
        repeats: cli.repeats,
        work_dir: cli.work_dir.clone(),
    };
    println!("\n{}", "▶ Running trials".bold().green());
    let results = harness::run(&batch, &formats, &config)?;

    let suite = BenchSuite {
        system_info: SystemInfo::collect(),
        results,
    };
    report::print_suite(&suite);

    if let Some(ref dir) = cli.export {
        std::fs::create_dir_all(dir)?;
        report::export_csv(&suite.results, &dir.join("benchmark_results.csv"))?;
        report::export_json(&suite, &dir.join("benchmark_results.json"))?;
    }

    Ok(())
}
