//! Error types for the life expectancy reshape pipeline.
//!
//! One error type per pipeline stage:
//!
//! - [`LoadError`] - reading and tokenizing the input table
//! - [`SchemaError`] - composite identifier decomposition
//! - [`TypeError`] - year label and value coercion
//! - [`ConfigError`] - dataset configuration files
//! - [`SaveError`] - writing the output CSV
//! - [`PipelineError`] - top-level orchestration
//!
//! Every stage error converts into [`PipelineError`] via `From`, so `?` works
//! across stage boundaries.

use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while loading the delimited input table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File missing or unreadable.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Bytes could not be decoded as text.
    #[error("Failed to decode input: {0}")]
    Encoding(String),

    /// No header row.
    #[error("Input table is empty")]
    EmptyFile,

    /// Ragged rows or other structural damage.
    #[error("Malformed table at line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// Header collapsed into a single column, usually the wrong delimiter.
    #[error("Expected a delimited table but found {found} column(s); check the delimiter")]
    TooFewColumns { found: usize },
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors while decomposing the composite identifier column.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The identifier column is not in the header.
    #[error("Identifier column '{0}' not found")]
    MissingIdentifierColumn(String),

    /// A row's identifier did not split into the expected dimensions.
    #[error("Line {line}: identifier '{value}' has {parts} part(s), expected {expected}")]
    BadIdentifier {
        line: usize,
        value: String,
        parts: usize,
        expected: usize,
    },

    /// One of the identifier parts is empty or whitespace.
    #[error("Line {line}: identifier '{value}' has a blank part at position {position}")]
    BlankDimension {
        line: usize,
        value: String,
        position: usize,
    },
}

// =============================================================================
// Type Errors
// =============================================================================

/// Errors while coercing year labels and values.
#[derive(Debug, Error)]
pub enum TypeError {
    /// A year label is not an integer.
    #[error("Year label '{label}' is not an integer")]
    Year { label: String },

    /// A sanitized value token is not a finite number.
    #[error("Value '{token}' for year {year} in region '{geo}' is not a finite number")]
    Value {
        geo: String,
        year: i32,
        token: String,
    },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors from dataset configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structurally valid but unusable configuration.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

// =============================================================================
// Save Errors
// =============================================================================

/// Errors while writing the output CSV.
#[derive(Debug, Error)]
pub enum SaveError {
    /// IO error.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("Failed to serialize output: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline error.
///
/// Returned by [`crate::ReshapePipeline::run`]. Every variant is fatal.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Type error: {0}")]
    Type(#[from] TypeError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Save error: {0}")]
    Save(#[from] SaveError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type LoadResult<T> = Result<T, LoadError>;

pub type SchemaResult<T> = Result<T, SchemaError>;

pub type TypeResult<T> = Result<T, TypeError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

pub type SaveResult<T> = Result<T, SaveError>;

pub type PipelineResult<T> = Result<T, PipelineError>;
