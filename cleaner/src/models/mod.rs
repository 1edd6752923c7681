//! Table states flowing through the reshape pipeline.
//!
//! ```text
//! RawTable ──split──▶ KeyedTable ──unpivot──▶ Vec<LongRow<String, String>>
//!                                                     │ coerce / sanitize / drop
//!                                                     ▼
//!                                             Vec<LongRecord>  (= LongRow<i32, f64>)
//! ```
//!
//! Each step consumes one state and returns the next. The type parameters of
//! [`LongRow`] track how far the year and value columns have been coerced.

use serde::Serialize;

/// A data row as loaded, with its 1-based line number in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<String>,
}

/// Header plus string rows, straight from the loader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The four dimensions packed into the composite identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub unit: String,
    pub sex: String,
    pub age: String,
    pub geo: String,
}

impl Dimensions {
    pub fn new(
        unit: impl Into<String>,
        sex: impl Into<String>,
        age: impl Into<String>,
        geo: impl Into<String>,
    ) -> Self {
        Self {
            unit: unit.into(),
            sex: sex.into(),
            age: age.into(),
            geo: geo.into(),
        }
    }
}

/// A row whose identifier has been decomposed. `cells` line up with
/// [`KeyedTable::columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedRow {
    pub line: usize,
    pub dims: Dimensions,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyedTable {
    /// Non-identifier column names
    pub columns: Vec<String>,
    pub rows: Vec<KeyedRow>,
}

/// One (stratum, year) observation in long format.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow<Y, V> {
    pub dims: Dimensions,
    pub year: Y,
    pub value: V,
}

impl<Y, V> LongRow<Y, V> {
    /// Replace the value, keeping dimensions and year.
    pub fn with_value<W>(self, value: W) -> LongRow<Y, W> {
        LongRow {
            dims: self.dims,
            year: self.year,
            value,
        }
    }

    /// Replace the year, keeping dimensions and value.
    pub fn with_year<Z>(self, year: Z) -> LongRow<Z, V> {
        LongRow {
            dims: self.dims,
            year,
            value: self.value,
        }
    }
}

/// Fully cleaned output row.
pub type LongRecord = LongRow<i32, f64>;

/// CSV shape of a [`LongRecord`]. `geo` is emitted as `region`.
#[derive(Debug, Serialize)]
pub struct OutputRow<'a> {
    pub unit: &'a str,
    pub sex: &'a str,
    pub age: &'a str,
    pub region: &'a str,
    pub year: i32,
    pub value: f64,
}

impl LongRecord {
    pub fn to_output(&self) -> OutputRow<'_> {
        OutputRow {
            unit: &self.dims.unit,
            sex: &self.dims.sex,
            age: &self.dims.age,
            region: &self.dims.geo,
            year: self.year,
            value: self.value,
        }
    }
}
