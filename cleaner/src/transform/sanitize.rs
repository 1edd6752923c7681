//! Type coercion and row cleaning for long-format rows.
//!
//! The order is fixed:
//!
//! 1. [`coerce_year`] - year label → `i32`
//! 2. [`sanitize_value`] - keep the first whitespace-delimited token
//! 3. [`drop_unusable`] - remove sentinel and blank candidates
//! 4. [`coerce_value`] - candidate → finite `f64`
//! 5. [`filter_region`] - keep one `geo` code
//!
//! Sentinel and blank checks run on the token string, so they must sit
//! between token extraction and numeric coercion.

use crate::error::{TypeError, TypeResult};
use crate::models::{LongRecord, LongRow};

/// Rows removed by [`drop_unusable`], by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
    pub sentinel: usize,
    pub blank: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.sentinel + self.blank
    }
}

/// Trim the year label and parse it as a 32-bit integer.
pub fn coerce_year<V>(rows: Vec<LongRow<String, V>>) -> TypeResult<Vec<LongRow<i32, V>>> {
    rows.into_iter()
        .map(|row| {
            let year = row
                .year
                .trim()
                .parse::<i32>()
                .map_err(|_| TypeError::Year {
                    label: row.year.clone(),
                })?;
            Ok(row.with_year(year))
        })
        .collect()
}

/// First whitespace-delimited token of a raw cell.
///
/// `"75.2 b"` → `Some("75.2")`, `"  "` → `None`.
pub fn first_token(raw: &str) -> Option<&str> {
    raw.split_whitespace().next()
}

/// Strip trailing annotation flags from every value.
pub fn sanitize_value<Y>(rows: Vec<LongRow<Y, String>>) -> Vec<LongRow<Y, Option<String>>> {
    rows.into_iter()
        .map(|row| {
            let token = first_token(&row.value).map(str::to_string);
            row.with_value(token)
        })
        .collect()
}

/// Remove rows whose candidate is missing or exactly the sentinel token.
pub fn drop_unusable<Y>(
    rows: Vec<LongRow<Y, Option<String>>>,
    sentinel: &str,
) -> (Vec<LongRow<Y, String>>, DropCounts) {
    let mut counts = DropCounts::default();

    let kept = rows
        .into_iter()
        .filter_map(|LongRow { dims, year, value }| match value {
            None => {
                counts.blank += 1;
                None
            }
            Some(token) if token == sentinel => {
                counts.sentinel += 1;
                None
            }
            Some(token) => Some(LongRow { dims, year, value: token }),
        })
        .collect();

    (kept, counts)
}

/// Parse candidate tokens as finite 64-bit floats.
pub fn coerce_value(rows: Vec<LongRow<i32, String>>) -> TypeResult<Vec<LongRecord>> {
    rows.into_iter()
        .map(|row| match row.value.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(row.with_value(value)),
            _ => Err(TypeError::Value {
                geo: row.dims.geo.clone(),
                year: row.year,
                token: row.value.clone(),
            }),
        })
        .collect()
}

/// Keep rows whose `geo` equals `region` exactly (case-sensitive).
pub fn filter_region<Y, V>(rows: Vec<LongRow<Y, V>>, region: &str) -> Vec<LongRow<Y, V>> {
    rows.into_iter().filter(|row| row.dims.geo == region).collect()
}
