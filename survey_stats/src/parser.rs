// Primitives for turning a survey export into records.

use log::debug;
use std::collections::HashMap;

use crate::builder::RecordBuilder;
use crate::config::*;

/// Rows with fewer tokens are considered truncated and skipped.
pub const MIN_FIELDS: usize = 5;

type Layout = Vec<(Field, ColumnPosition)>;

/// Splits one line of the export into fields.
///
/// A double quote toggles the quoted mode and is never kept. Commas inside
/// quotes do not end a field. Escaped quotes (`""`) are not supported: they
/// simply toggle the quoted mode twice.
pub fn split_line(line: &str) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => res.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    res.push(current);
    res
}

/// Parses the full text of an export, using the standard column positions.
///
/// The first line is the header and is ignored. Blank lines and rows with
/// fewer than `MIN_FIELDS` tokens are skipped. No other row is rejected.
pub fn parse_records(text: &str) -> Vec<SurveyRecord> {
    let layout = positional_layout();
    let mut lines = text.split('\n');
    // Skip header
    lines.next();
    lines
        .enumerate()
        .filter_map(|(idx, line)| record_from_line(idx + 2, line, &layout))
        .collect()
}

/// Parses the full text of an export with the given column mapping.
pub fn parse_records_with(
    text: &str,
    mapping: &ColumnMapping,
) -> Result<Vec<SurveyRecord>, ParseErrors> {
    let mut lines = text.split('\n');
    let header_line = lines.next().unwrap_or("");
    let layout = match mapping {
        ColumnMapping::Positional => positional_layout(),
        ColumnMapping::Header(columns) => {
            if header_line.trim().is_empty() {
                return Err(ParseErrors::MissingHeader);
            }
            header_layout(columns, &split_line(header_line.trim()))?
        }
    };
    debug!("parse_records_with: layout: {:?}", layout);
    Ok(lines
        .enumerate()
        .filter_map(|(idx, line)| record_from_line(idx + 2, line, &layout))
        .collect())
}

/// Maps rows that were already split into cells (for example from a
/// spreadsheet). The first row is the header.
pub fn records_from_rows(
    rows: &[Vec<String>],
    mapping: &ColumnMapping,
) -> Result<Vec<SurveyRecord>, ParseErrors> {
    let (header, data) = rows.split_first().ok_or(ParseErrors::MissingHeader)?;
    let layout = match mapping {
        ColumnMapping::Positional => positional_layout(),
        ColumnMapping::Header(columns) => header_layout(columns, header)?,
    };
    let mut res: Vec<SurveyRecord> = Vec::new();
    for (idx, row) in data.iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if let Some(record) = record_from_tokens(idx + 2, row, &layout) {
            res.push(record);
        }
    }
    Ok(res)
}

fn positional_layout() -> Layout {
    Field::ALL
        .iter()
        .map(|f| (*f, f.default_position()))
        .collect()
}

/// Finds the position of every requested column in the header.
fn header_layout(columns: &[(Field, String)], header: &[String]) -> Result<Layout, ParseErrors> {
    let col_names: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim(), idx))
        .collect();
    debug!("header_layout: col_names: {:?}", col_names);

    let mut layout: Layout = Vec::new();
    for (field, name) in columns.iter() {
        let idx = col_names
            .get(name.trim())
            .ok_or_else(|| ParseErrors::MissingColumn(name.clone()))?;
        layout.push((*field, ColumnPosition::Index(*idx)));
    }
    Ok(layout)
}

fn record_from_line(lineno: usize, line: &str, layout: &Layout) -> Option<SurveyRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    record_from_tokens(lineno, &split_line(line), layout)
}

fn record_from_tokens(lineno: usize, tokens: &[String], layout: &Layout) -> Option<SurveyRecord> {
    if tokens.len() < MIN_FIELDS {
        debug!(
            "record_from_tokens: line {}: skipping row with {} fields",
            lineno,
            tokens.len()
        );
        return None;
    }
    let mut builder = RecordBuilder::new();
    for (field, position) in layout.iter() {
        let token = match position {
            ColumnPosition::Index(idx) => tokens.get(*idx),
            ColumnPosition::Last => tokens.last(),
        };
        if let Some(s) = token {
            builder.set(*field, s);
        }
    }
    Some(builder.build())
}
