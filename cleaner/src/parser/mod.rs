//! Delimited table loader with encoding detection.
//!
//! Produces a [`RawTable`] of untouched strings: header names and cells keep
//! their surrounding whitespace, which later steps normalize explicitly.
//!
//! Two tokenizers are available:
//! - [`DelimiterMode::Strict`]: tab separated, read with the `csv` crate
//! - [`DelimiterMode::Tolerant`]: tab *or* comma, which also splits the
//!   composite identifier into its four columns

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::config::DelimiterMode;
use crate::error::{LoadError, LoadResult};
use crate::logs::log_warning;
use crate::models::{RawRow, RawTable};

static TAB_OR_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t,]").expect("valid regex"));

/// Loaded table plus the encoding it was decoded from
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: RawTable,
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to text with an explicit encoding label.
///
/// Bytes must be valid for the label; nothing is replaced silently.
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => std::str::from_utf8(bytes)
            .map_err(|e| LoadError::Encoding(format!("input is not valid UTF-8: {}", e)))?
            .to_string(),
        label => {
            let enc = encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| LoadError::Encoding(format!("unsupported encoding '{}'", label)))?;
            let (decoded, _, had_errors) = enc.decode(bytes);
            if had_errors {
                return Err(LoadError::Encoding(format!("input is not valid {}", enc.name())));
            }
            decoded.into_owned()
        }
    };

    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Decode input bytes, preferring UTF-8.
///
/// Valid UTF-8 is always taken as UTF-8. Only when that fails is chardet
/// consulted for a legacy 8-bit encoding; a chardet verdict of UTF-8 on
/// invalid bytes is an error.
pub fn decode_input(bytes: &[u8]) -> LoadResult<(String, String)> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok((
            "utf-8".to_string(),
            text.trim_start_matches('\u{feff}').to_string(),
        ));
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    log_warning(format!("Input is not UTF-8, decoded as {}", encoding));

    Ok((encoding, content))
}

/// Load a table from disk.
pub fn load_table(path: impl AsRef<Path>, mode: DelimiterMode) -> LoadResult<LoadedTable> {
    let bytes = std::fs::read(path.as_ref())?;
    load_bytes(&bytes, mode)
}

/// Load a table from raw bytes.
pub fn load_bytes(bytes: &[u8], mode: DelimiterMode) -> LoadResult<LoadedTable> {
    let (encoding, content) = decode_input(bytes)?;
    let table = parse_table(&content, mode)?;

    Ok(LoadedTable { table, encoding })
}

/// Tokenize decoded text into a [`RawTable`].
pub fn parse_table(content: &str, mode: DelimiterMode) -> LoadResult<RawTable> {
    if content.trim().is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let table = match mode {
        DelimiterMode::Strict => parse_tab_separated(content)?,
        DelimiterMode::Tolerant => parse_tab_or_comma(content)?,
    };

    if table.headers.len() < 2 {
        return Err(LoadError::TooFewColumns {
            found: table.headers.len(),
        });
    }

    Ok(table)
}

fn parse_tab_separated(content: &str) -> LoadResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(false)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(1, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(rows.len() + 2);
            malformed(line, e)
        })?;

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(rows.len() + 2);

        rows.push(RawRow {
            line,
            cells: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(RawTable::new(headers, rows))
}

fn parse_tab_or_comma(content: &str) -> LoadResult<RawTable> {
    let mut lines = content.lines().enumerate();

    let (_, header_line) = lines
        .find(|(_, line)| !line.trim().is_empty())
        .ok_or(LoadError::EmptyFile)?;

    let headers: Vec<String> = TAB_OR_COMMA
        .split(header_line)
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let line_num = idx + 1;

        if line.trim().is_empty() {
            continue;
        }

        let cells: Vec<String> = TAB_OR_COMMA.split(line).map(str::to_string).collect();
        if cells.len() != headers.len() {
            return Err(LoadError::Malformed {
                line: line_num,
                message: format!(
                    "found {} field(s), header has {}",
                    cells.len(),
                    headers.len()
                ),
            });
        }

        rows.push(RawRow { line: line_num, cells });
    }

    Ok(RawTable::new(headers, rows))
}

fn malformed(line: usize, err: csv::Error) -> LoadError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => LoadError::Io(io),
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => LoadError::Malformed {
            line,
            message: format!("found {} field(s), header has {}", len, expected_len),
        },
        other => LoadError::Malformed {
            line,
            message: format!("{:?}", other),
        },
    }
}
