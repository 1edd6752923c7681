//! High-level pipeline API: load, reshape, clean, filter, save.
//!
//! # Example
//!
//! ```rust,ignore
//! use life_expectancy::{DatasetSpec, ReshapePipeline};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = ReshapePipeline::new(DatasetSpec::default()).run(
//!         Path::new("data/eu_life_expectancy_raw.tsv"),
//!         Path::new("data/pt_life_expectancy.csv"),
//!         "PT",
//!     )?;
//!
//!     println!("Wrote {} rows", report.rows_out);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::reshape::{normalize_headers, split_identifier, unpivot, year_column_count};
use super::sanitize::{
    coerce_value, coerce_year, drop_unusable, filter_region, sanitize_value, DropCounts,
};
use crate::config::DatasetSpec;
use crate::error::{PipelineResult, SaveResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{LongRecord, RawTable};
use crate::parser::load_table;

/// Row accounting for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Data rows in the wide input
    pub rows_in: usize,
    /// Columns treated as years
    pub year_columns: usize,
    /// Rows after unpivoting
    pub melted: usize,
    pub dropped_sentinel: usize,
    pub dropped_blank: usize,
    /// Rows left after the region filter
    pub rows_out: usize,
    /// Where the output was written, when it was
    pub output_path: Option<PathBuf>,
}

/// Cleaned records plus the accounting that produced them
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub records: Vec<LongRecord>,
    pub report: RunReport,
}

/// Wide-to-long reshape for one dataset schema.
#[derive(Debug, Clone, Default)]
pub struct ReshapePipeline {
    spec: DatasetSpec,
}

impl ReshapePipeline {
    pub fn new(spec: DatasetSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &DatasetSpec {
        &self.spec
    }

    /// Load `input`, clean it for `region` and write the CSV to `output`.
    ///
    /// The output file is only created once every step has succeeded.
    pub fn run(&self, input: &Path, output: &Path, region: &str) -> PipelineResult<RunReport> {
        self.spec.validate()?;

        log_info(format!("📖 Reading {}", input.display()));
        let loaded = load_table(input, self.spec.delimiter)?;
        log_success(format!("Detected encoding: {}", loaded.encoding));
        log_success(format!(
            "Read {} rows, {} columns",
            loaded.table.len(),
            loaded.table.headers.len()
        ));

        let CleanOutput { records, mut report } = self.clean(loaded.table, region)?;

        save_records(&records, output)?;
        log_success(format!("💾 Wrote {} rows to {}", records.len(), output.display()));

        report.output_path = Some(output.to_path_buf());
        Ok(report)
    }

    /// Steps between load and save. Pure apart from logging.
    pub fn clean(&self, table: RawTable, region: &str) -> PipelineResult<CleanOutput> {
        let spec = &self.spec;
        let mut report = RunReport {
            rows_in: table.len(),
            ..RunReport::default()
        };

        let table = normalize_headers(table);

        let keyed = split_identifier(table, spec)?;
        log_info("⚙️  Split identifier into unit, sex, age, geo");

        report.year_columns = year_column_count(&keyed, spec);
        if report.year_columns == 0 {
            log_warning(format!(
                "No columns fall inside years {}..{}",
                spec.years.start, spec.years.end
            ));
        }

        let melted = unpivot(keyed, spec);
        report.melted = melted.len();
        log_info_indent(
            format!("Unpivoted {} year columns into {} rows", report.year_columns, report.melted),
            1,
        );

        let years = coerce_year(melted)?;
        let candidates = sanitize_value(years);

        let (usable, DropCounts { sentinel, blank }) = drop_unusable(candidates, &spec.sentinel);
        report.dropped_sentinel = sentinel;
        report.dropped_blank = blank;
        log_info_indent(
            format!("Dropped {} '{}' and {} blank values", sentinel, spec.sentinel, blank),
            1,
        );

        let values = coerce_value(usable)?;
        let records = filter_region(values, region);
        report.rows_out = records.len();

        if records.is_empty() {
            log_warning(format!("No rows for region '{}'", region));
        } else {
            log_success(format!("Kept {} rows for region '{}'", records.len(), region));
        }

        Ok(CleanOutput { records, report })
    }
}

/// Write records as `unit,sex,age,region,year,value` with a header row.
pub fn save_records(records: &[LongRecord], path: &Path) -> SaveResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let terminator = if cfg!(windows) {
        csv::Terminator::CRLF
    } else {
        csv::Terminator::Any(b'\n')
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .terminator(terminator)
        .from_path(path)?;

    if records.is_empty() {
        writer.write_record(["unit", "sex", "age", "region", "year", "value"])?;
    }
    for record in records {
        writer.serialize(record.to_output())?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DelimiterMode, YearSpan};
    use crate::error::PipelineError;
    use crate::logs::{drain, LogLevel, LOG_BROADCASTER};
    use tempfile::tempdir;

    const HEADER: &str = "unit,sex,age,geo\\time\t1961 \t1960 ";

    fn write_input(dir: &Path, lines: &[&str]) -> PathBuf {
        let path = dir.join("eu_life_expectancy_raw.tsv");
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content).unwrap();
        path
    }

    fn quiet_pipeline() -> ReshapePipeline {
        LOG_BROADCASTER.set_quiet(true);
        ReshapePipeline::default()
    }

    #[test]
    fn test_scenario_single_region_row() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), &[HEADER, "X,F,Y,PT\t: \t75.2 b"]);
        let output = dir.path().join("pt_life_expectancy.csv");

        let report = quiet_pipeline().run(&input, &output, "PT").unwrap();

        assert_eq!(report.rows_out, 1);
        assert_eq!(report.dropped_sentinel, 1);
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "unit,sex,age,region,year,value\nX,F,Y,PT,1960,75.2\n"
                .replace('\n', if cfg!(windows) { "\r\n" } else { "\n" })
        );
    }

    #[test]
    fn test_scenario_other_region_is_empty() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), &[HEADER, "X,F,Y,PT\t: \t75.2 b"]);
        let output = dir.path().join("es_life_expectancy.csv");

        let report = quiet_pipeline().run(&input, &output, "ES").unwrap();

        assert_eq!(report.rows_out, 0);
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().collect::<Vec<_>>(), vec!["unit,sex,age,region,year,value"]);
    }

    #[test]
    fn test_scenario_three_part_identifier_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), &[HEADER, "X,F,PT\t70.0 \t75.2 b"]);
        let output = dir.path().join("pt_life_expectancy.csv");

        let err = quiet_pipeline().run(&input, &output, "PT").unwrap_err();

        assert!(matches!(err, PipelineError::Schema(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_scenario_whitespace_value_dropped() {
        let table = RawTable::new(
            vec![HEADER.split('\t').next().unwrap().to_string(), "1960".into()],
            vec![crate::models::RawRow {
                line: 2,
                cells: vec!["X,F,Y,PT".into(), "   ".into()],
            }],
        );

        let out = quiet_pipeline().clean(table, "PT").unwrap();

        assert!(out.records.is_empty());
        assert_eq!(out.report.dropped_blank, 1);
    }

    #[test]
    fn test_non_numeric_value_is_type_error() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), &[HEADER, "X,F,Y,PT\tabc \t75.2"]);
        let output = dir.path().join("out.csv");

        let err = quiet_pipeline().run(&input, &output, "PT").unwrap_err();
        assert!(matches!(err, PipelineError::Type(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input_is_load_error() {
        let dir = tempdir().unwrap();
        let err = quiet_pipeline()
            .run(&dir.path().join("nope.tsv"), &dir.path().join("out.csv"), "PT")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Load(_)));
    }

    #[test]
    fn test_row_count_bound_and_invariants() {
        let dir = tempdir().unwrap();
        let input = write_input(
            dir.path(),
            &[
                "unit,sex,age,geo\\time\t2021 \t2020 \t1959 \tnote",
                "YR,F,Y1,PT\t81.0 \t80.5 e\t60.0\tx",
                "YR,M,Y1,PT\t: \t77.3\t59.0\ty",
                "YR,F,Y1,ES\t84.0\t83.9 p\t61.0\tz",
            ],
        );
        let output = dir.path().join("out.csv");

        let pipeline = quiet_pipeline();
        let report = pipeline.run(&input, &output, "PT").unwrap();

        assert_eq!(report.rows_in, 3);
        assert_eq!(report.year_columns, 2);
        assert_eq!(report.melted, 6);
        assert!(report.rows_out <= report.rows_in * report.year_columns);
        assert_eq!(report.rows_out, 3);

        let mut reader = csv::Reader::from_path(&output).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            vec!["unit", "sex", "age", "region", "year", "value"]
        );
        for record in reader.records() {
            let record = record.unwrap();
            assert_eq!(&record[3], "PT");
            let year: i32 = record[4].parse().unwrap();
            assert!(pipeline.spec().years.contains(year));
            let value: f64 = record[5].parse().unwrap();
            assert!(value.is_finite());
        }
    }

    #[test]
    fn test_no_drops_means_full_row_count() {
        let table = RawTable::new(
            vec!["unit,sex,age,geo\\time".into(), "2000".into(), "2001".into()],
            vec![
                crate::models::RawRow {
                    line: 2,
                    cells: vec!["YR,F,Y1,PT".into(), "1".into(), "2".into()],
                },
                crate::models::RawRow {
                    line: 3,
                    cells: vec!["YR,M,Y1,PT".into(), "3".into(), "4".into()],
                },
            ],
        );

        let out = quiet_pipeline().clean(table, "PT").unwrap();
        assert_eq!(out.report.rows_out, out.report.rows_in * out.report.year_columns);
    }

    #[test]
    fn test_whole_numbers_keep_decimal_point() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), &[HEADER, "X,F,Y,PT\t80 \t79.25"]);
        let output = dir.path().join("out.csv");

        quiet_pipeline().run(&input, &output, "PT").unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("X,F,Y,PT,1961,80.0"));
        assert!(written.contains("X,F,Y,PT,1960,79.25"));
    }

    #[test]
    fn test_tolerant_mode_end_to_end() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), &[HEADER, "X,F,Y,PT\t70.1 \t75.2 b"]);
        let output = dir.path().join("nested").join("out.csv");

        let spec = DatasetSpec::default()
            .with_delimiter(DelimiterMode::Tolerant)
            .with_years(YearSpan::new(1960, 1961));
        LOG_BROADCASTER.set_quiet(true);
        let report = ReshapePipeline::new(spec).run(&input, &output, "PT").unwrap();

        assert_eq!(report.year_columns, 1);
        assert_eq!(report.rows_out, 1);
        assert!(output.exists());
    }

    #[test]
    fn test_run_emits_step_logs() {
        let mut rx = LOG_BROADCASTER.subscribe();
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), &[HEADER, "X,F,Y,PT\t: \t75.2 b"]);

        quiet_pipeline()
            .run(&input, &dir.path().join("out.csv"), "PT")
            .unwrap();

        let entries = drain(&mut rx);
        assert!(entries
            .iter()
            .any(|e| e.level == LogLevel::Success && e.message.contains("Kept 1 rows")));
    }
}
