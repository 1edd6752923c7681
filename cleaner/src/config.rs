//! Dataset configuration.
//!
//! Column names, separators, the sentinel token and the year span are fixed
//! per dataset. They live in one immutable [`DatasetSpec`] that is handed to
//! every pipeline step, so schema variants can be exercised in isolation.
//!
//! The built-in default describes the Eurostat `demo_mlexpec` extract:
//!
//! ```text
//! unit,sex,age,geo\time   2021    2020    ...  1960
//! YR,F,Y1,AT              83.8    84.0 e  ...  :
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Number of dimensions packed into the composite identifier.
pub const IDENTIFIER_PARTS: usize = 4;

/// How input lines are tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterMode {
    /// Tab only. Commas stay inside the composite identifier.
    #[default]
    Strict,
    /// Tab or comma. The identifier header and cells are split by the loader.
    Tolerant,
}

/// Half-open range of supported years, `start <= year < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSpan {
    pub start: i32,
    pub end: i32,
}

impl YearSpan {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year < self.end
    }

    /// Number of years in the span.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end.abs_diff(self.start) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Parse a column label as a year inside the span.
    pub fn match_label(&self, label: &str) -> Option<i32> {
        label
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|year| self.contains(*year))
    }
}

impl Default for YearSpan {
    fn default() -> Self {
        Self::new(1960, 2022)
    }
}

/// Immutable description of the input schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSpec {
    /// Header of the composite identifier column.
    pub identifier_column: String,
    /// Separator inside the composite identifier.
    pub identifier_separator: String,
    /// Token marking an intentionally missing observation.
    pub sentinel: String,
    /// Year columns to unpivot.
    pub years: YearSpan,
    /// Line tokenization mode.
    pub delimiter: DelimiterMode,
}

impl Default for DatasetSpec {
    fn default() -> Self {
        Self {
            identifier_column: "unit,sex,age,geo\\time".to_string(),
            identifier_separator: ",".to_string(),
            sentinel: ":".to_string(),
            years: YearSpan::default(),
            delimiter: DelimiterMode::Strict,
        }
    }
}

impl DatasetSpec {
    /// Load a spec from a JSON file. Missing fields take the defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let spec: Self = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_delimiter(mut self, delimiter: DelimiterMode) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_years(mut self, years: YearSpan) -> Self {
        self.years = years;
        self
    }

    /// Header names of the four dimensions, as they appear once the
    /// identifier header is split (`unit`, `sex`, `age`, `geo\time`).
    pub fn dimension_headers(&self) -> Vec<String> {
        self.identifier_column
            .split(self.identifier_separator.as_str())
            .map(|s| s.trim().to_string())
            .collect()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.identifier_separator.is_empty() {
            return Err(ConfigError::Invalid("identifier separator is empty".into()));
        }
        if self.sentinel.is_empty() {
            return Err(ConfigError::Invalid("sentinel token is empty".into()));
        }
        if self.years.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "year span {}..{} is empty",
                self.years.start, self.years.end
            )));
        }
        let parts = self.dimension_headers().len();
        if parts != IDENTIFIER_PARTS {
            return Err(ConfigError::Invalid(format!(
                "identifier column '{}' has {} part(s), expected {}",
                self.identifier_column, parts, IDENTIFIER_PARTS
            )));
        }
        Ok(())
    }
}
