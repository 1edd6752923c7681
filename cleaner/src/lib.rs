//! # Life Expectancy - wide TSV to long CSV
//!
//! Reshapes a Eurostat-style life expectancy table (one row per stratum, one
//! column per year) into long-format records for a single region.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  TSV File   │────▶│   Parser    │────▶│  Transform  │────▶│  CSV File   │
//! │   (wide)    │     │ (auto-enc)  │     │ (9 steps)   │     │ (1 region)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use life_expectancy::{DatasetSpec, ReshapePipeline};
//! use std::path::Path;
//!
//! let report = ReshapePipeline::new(DatasetSpec::default())
//!     .run(Path::new("raw.tsv"), Path::new("pt.csv"), "PT")
//!     .unwrap();
//! println!("{} rows", report.rows_out);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`config`] - Dataset schema configuration
//! - [`models`] - Table states between steps
//! - [`parser`] - Delimited table loading
//! - [`transform`] - Reshape, sanitize and pipeline
//! - [`logs`] - Step logging

pub mod config;
pub mod error;
pub mod logs;
pub mod models;
pub mod parser;
pub mod transform;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{DatasetSpec, DelimiterMode, YearSpan, IDENTIFIER_PARTS};

pub use error::{
    ConfigError, LoadError, PipelineError, PipelineResult, SaveError, SchemaError, TypeError,
};

pub use models::{Dimensions, KeyedTable, LongRecord, LongRow, RawRow, RawTable};

pub use parser::{load_bytes, load_table, parse_table, LoadedTable};

pub use transform::{save_records, CleanOutput, ReshapePipeline, RunReport};

/// Default input file name inside the data directory.
pub const INPUT_FILE: &str = "eu_life_expectancy_raw.tsv";

/// Output file name for a region, e.g. `pt_life_expectancy.csv`.
pub fn output_file_name(region: &str) -> String {
    format!("{}_life_expectancy.csv", region.to_lowercase())
}
