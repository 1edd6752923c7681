//! Shape-changing steps: header normalization, identifier split, unpivot.
//!
//! ```text
//! unit,sex,age,geo\time | 1961 | 1960        unit sex age geo  year  value
//! ──────────────────────┼──────┼──────   →   ─────────────────────────────
//! YR,F,Y1,PT            | :    | 75.2 b      YR   F   Y1  PT   1961  ":"
//!                                            YR   F   Y1  PT   1960  "75.2 b"
//! ```

use crate::config::{DatasetSpec, DelimiterMode, IDENTIFIER_PARTS};
use crate::error::{SchemaError, SchemaResult};
use crate::models::{Dimensions, KeyedRow, KeyedTable, LongRow, RawTable};

/// Trim surrounding whitespace from every column name.
pub fn normalize_headers(table: RawTable) -> RawTable {
    RawTable {
        headers: table.headers.iter().map(|h| h.trim().to_string()).collect(),
        rows: table.rows,
    }
}

/// Decompose the composite identifier into [`Dimensions`].
///
/// In strict mode the identifier is one column whose cells are split on the
/// configured separator. In tolerant mode the loader already split header and
/// cells, so the four dimension columns are picked up by name.
pub fn split_identifier(table: RawTable, spec: &DatasetSpec) -> SchemaResult<KeyedTable> {
    match spec.delimiter {
        DelimiterMode::Strict => split_composite(table, spec),
        DelimiterMode::Tolerant => collect_dimensions(table, spec),
    }
}

fn split_composite(table: RawTable, spec: &DatasetSpec) -> SchemaResult<KeyedTable> {
    let id_idx = table
        .column_index(&spec.identifier_column)
        .ok_or_else(|| SchemaError::MissingIdentifierColumn(spec.identifier_column.clone()))?;

    let columns = without_index(&table.headers, &[id_idx]);

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in table.rows {
        let raw_id = row.cells.get(id_idx).map(String::as_str).unwrap_or("");
        let parts: Vec<&str> = if raw_id.trim().is_empty() {
            Vec::new()
        } else {
            raw_id.split(spec.identifier_separator.as_str()).collect()
        };

        let dims = dimensions_from(&parts, row.line, raw_id)?;

        rows.push(KeyedRow {
            line: row.line,
            dims,
            cells: without_index(&row.cells, &[id_idx]),
        });
    }

    Ok(KeyedTable { columns, rows })
}

fn collect_dimensions(table: RawTable, spec: &DatasetSpec) -> SchemaResult<KeyedTable> {
    let mut dim_idx = Vec::with_capacity(IDENTIFIER_PARTS);
    for name in spec.dimension_headers() {
        let idx = table
            .column_index(&name)
            .ok_or_else(|| SchemaError::MissingIdentifierColumn(spec.identifier_column.clone()))?;
        dim_idx.push(idx);
    }

    let columns = without_index(&table.headers, &dim_idx);

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in table.rows {
        let parts: Vec<&str> = dim_idx
            .iter()
            .filter_map(|&i| row.cells.get(i).map(String::as_str))
            .collect();
        let raw_id = parts.join(spec.identifier_separator.as_str());

        let dims = dimensions_from(&parts, row.line, &raw_id)?;

        rows.push(KeyedRow {
            line: row.line,
            dims,
            cells: without_index(&row.cells, &dim_idx),
        });
    }

    Ok(KeyedTable { columns, rows })
}

/// Both delimiter modes go through here: exactly four parts, none blank.
fn dimensions_from(parts: &[&str], line: usize, raw_id: &str) -> SchemaResult<Dimensions> {
    let [unit, sex, age, geo] = parts else {
        return Err(SchemaError::BadIdentifier {
            line,
            value: raw_id.to_string(),
            parts: parts.len(),
            expected: IDENTIFIER_PARTS,
        });
    };

    if let Some(position) = parts.iter().position(|p| p.trim().is_empty()) {
        return Err(SchemaError::BlankDimension {
            line,
            value: raw_id.to_string(),
            position: position + 1,
        });
    }

    Ok(Dimensions::new(unit.trim(), sex.trim(), age.trim(), geo.trim()))
}

fn without_index(values: &[String], skip: &[usize]) -> Vec<String> {
    values
        .iter()
        .enumerate()
        .filter(|(i, _)| !skip.contains(i))
        .map(|(_, v)| v.clone())
        .collect()
}

/// Melt year columns into one row per (dimensions, year) pair.
///
/// Only columns whose label is a year inside the configured span take part;
/// years missing from the input are simply absent. Rows are emitted in
/// column-major order, like a dataframe melt.
pub fn unpivot(table: KeyedTable, spec: &DatasetSpec) -> Vec<LongRow<String, String>> {
    let year_columns: Vec<(usize, &String)> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, label)| spec.years.match_label(label).is_some())
        .collect();

    let mut long = Vec::with_capacity(year_columns.len() * table.rows.len());
    for (col, label) in &year_columns {
        for row in &table.rows {
            long.push(LongRow {
                dims: row.dims.clone(),
                year: (*label).clone(),
                value: row.cells.get(*col).cloned().unwrap_or_default(),
            });
        }
    }

    long
}

/// Number of columns [`unpivot`] will treat as years.
pub fn year_column_count(table: &KeyedTable, spec: &DatasetSpec) -> usize {
    table
        .columns
        .iter()
        .filter(|label| spec.years.match_label(label).is_some())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::YearSpan;
    use crate::models::RawRow;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            strings(headers),
            rows.iter()
                .enumerate()
                .map(|(i, cells)| RawRow {
                    line: i + 2,
                    cells: strings(cells),
                })
                .collect(),
        )
    }

    #[test]
    fn test_normalize_headers_trims() {
        let table = raw(&[" unit,sex,age,geo\\time ", "2000 ", "\t1999"], &[]);
        let table = normalize_headers(table);
        assert_eq!(table.headers, vec!["unit,sex,age,geo\\time", "2000", "1999"]);
    }

    #[test]
    fn test_split_identifier_strict() {
        let table = raw(
            &["unit,sex,age,geo\\time", "2000"],
            &[&["YR,F,Y1,PT", "80.1"]],
        );
        let keyed = split_identifier(table, &DatasetSpec::default()).unwrap();

        assert_eq!(keyed.columns, vec!["2000"]);
        assert_eq!(keyed.rows[0].dims, Dimensions::new("YR", "F", "Y1", "PT"));
        assert_eq!(keyed.rows[0].cells, vec!["80.1"]);
    }

    #[test]
    fn test_split_identifier_three_parts_fails() {
        let table = raw(&["unit,sex,age,geo\\time", "2000"], &[&["YR,F,PT", "80.1"]]);
        let err = split_identifier(table, &DatasetSpec::default()).unwrap_err();

        match err {
            SchemaError::BadIdentifier { line, parts, .. } => {
                assert_eq!(line, 2);
                assert_eq!(parts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_split_identifier_whitespace_only_fails() {
        let table = raw(&["unit,sex,age,geo\\time", "2000"], &[&["   ", "80.1"]]);
        let err = split_identifier(table, &DatasetSpec::default()).unwrap_err();
        assert!(matches!(err, SchemaError::BadIdentifier { parts: 0, .. }));
    }

    #[test]
    fn test_split_identifier_missing_column() {
        let table = raw(&["id", "2000"], &[&["YR,F,Y1,PT", "80.1"]]);
        let err = split_identifier(table, &DatasetSpec::default()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingIdentifierColumn(_)));
    }

    #[test]
    fn test_split_identifier_tolerant() {
        let spec = DatasetSpec::default().with_delimiter(DelimiterMode::Tolerant);
        let table = raw(
            &["unit", "sex", "age", "geo\\time", "2000"],
            &[&["YR", "M", "Y65", "ES", "18.0"]],
        );
        let keyed = split_identifier(table, &spec).unwrap();

        assert_eq!(keyed.columns, vec!["2000"]);
        assert_eq!(keyed.rows[0].dims.geo, "ES");
        assert_eq!(keyed.rows[0].cells, vec!["18.0"]);
    }

    #[test]
    fn test_blank_dimension_fails_in_both_modes() {
        let strict = raw(&["unit,sex,age,geo\\time", "2000"], &[&["YR, ,Y65,ES", "18.0"]]);
        let err = split_identifier(strict, &DatasetSpec::default()).unwrap_err();
        assert!(matches!(err, SchemaError::BlankDimension { position: 2, .. }));

        let spec = DatasetSpec::default().with_delimiter(DelimiterMode::Tolerant);
        let tolerant = raw(
            &["unit", "sex", "age", "geo\\time", "2000"],
            &[&["YR", " ", "Y65", "ES", "18.0"]],
        );
        let err = split_identifier(tolerant, &spec).unwrap_err();
        assert!(matches!(err, SchemaError::BlankDimension { position: 2, .. }));
    }

    #[test]
    fn test_unpivot_only_years_in_span() {
        let spec = DatasetSpec::default().with_years(YearSpan::new(2000, 2002));
        let keyed = KeyedTable {
            columns: strings(&["flag", "2002", "2001", "2000"]),
            rows: vec![
                KeyedRow {
                    line: 2,
                    dims: Dimensions::new("YR", "F", "Y1", "PT"),
                    cells: strings(&["x", "1", "2", "3"]),
                },
                KeyedRow {
                    line: 3,
                    dims: Dimensions::new("YR", "M", "Y1", "PT"),
                    cells: strings(&["y", "4", "5", ""]),
                },
            ],
        };

        assert_eq!(year_column_count(&keyed, &spec), 2);
        let long = unpivot(keyed, &spec);

        assert_eq!(long.len(), 4);
        assert_eq!(long[0].year, "2001");
        assert_eq!(long[0].value, "2");
        assert_eq!(long[1].dims.sex, "M");
        assert_eq!(long[1].value, "5");
        assert_eq!(long[3].year, "2000");
        assert_eq!(long[3].value, "");
    }
}
