//! Transformation module.
//!
//! - Reshape: header normalization, identifier split, unpivot
//! - Sanitize: type coercion, sentinel/blank removal, region filter
//! - Pipeline: ordered composition of the steps plus load and save

pub mod pipeline;
pub mod reshape;
pub mod sanitize;

pub use pipeline::*;
pub use reshape::{normalize_headers, split_identifier, unpivot, year_column_count};
pub use sanitize::{
    coerce_value, coerce_year, drop_unusable, filter_region, first_token, sanitize_value,
    DropCounts,
};
