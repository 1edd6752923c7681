//! Life expectancy CLI - reshape the wide Eurostat TSV into a regional CSV
//!
//! ```bash
//! life_expectancy                      # PT, data/eu_life_expectancy_raw.tsv
//! life_expectancy --region es          # writes data/es_life_expectancy.csv
//! life_expectancy --input raw.tsv --output out.csv --tolerant
//! life_expectancy --config spec.json   # custom identifier/sentinel/years
//! ```

use clap::Parser;
use life_expectancy::logs::{log_error, LOG_BROADCASTER};
use life_expectancy::{output_file_name, DatasetSpec, DelimiterMode, ReshapePipeline, INPUT_FILE};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "life_expectancy")]
#[command(about = "Clean the EU life expectancy table for one region", long_about = None)]
struct Cli {
    /// Region code to keep (upper-cased before use)
    #[arg(short, long, default_value = "PT")]
    region: String,

    /// Directory holding the input and default output
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Input TSV (default: <data-dir>/eu_life_expectancy_raw.tsv)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output CSV (default: <data-dir>/<region>_life_expectancy.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dataset spec JSON overriding the built-in schema
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Split on tabs or commas instead of tabs only
    #[arg(long)]
    tolerant: bool,

    /// Don't print step logs
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    LOG_BROADCASTER.set_quiet(cli.quiet);

    let region = cli.region.trim().to_uppercase();

    let mut spec = match &cli.config {
        Some(path) => DatasetSpec::from_json_file(path)?,
        None => DatasetSpec::default(),
    };
    if cli.tolerant {
        spec = spec.with_delimiter(DelimiterMode::Tolerant);
    }

    let input = cli.input.unwrap_or_else(|| cli.data_dir.join(INPUT_FILE));
    let output = cli
        .output
        .unwrap_or_else(|| cli.data_dir.join(output_file_name(&region)));

    let report = ReshapePipeline::new(spec).run(&input, &output, &region)?;

    if !cli.quiet {
        eprintln!(
            "\n✨ Done: {} rows in, {} melted, {} dropped, {} kept for {}",
            report.rows_in,
            report.melted,
            report.dropped_sentinel + report.dropped_blank,
            report.rows_out,
            region
        );
    }

    Ok(())
}
