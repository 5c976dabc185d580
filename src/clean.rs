//! Best-effort cleanup of externally sourced ECU spreadsheets.
//!
//! Raw exports from other tools tend to carry broken quoting and extra
//! columns. [`clean_csv`] turns such input into a file with exactly the
//! canonical `num_bosch,modelo_ecu,fabricante` header:
//!
//! 1. every line loses quotes next to separators and any stray quote,
//! 2. header names are normalized and mapped through a fixed alias table,
//! 3. only the part-number, model and manufacturer columns are kept,
//! 4. rows without a part number or model are dropped,
//! 5. repeated `(part_number, model_name)` pairs keep their first row.
//!
//! The transform is lossy on purpose. Rows that cannot be parsed are dropped
//! and counted in [`CleanReport`], never reported as errors.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::reconcile::{self, CANONICAL_HEADER};

/// Normalized header names mapped onto a canonical column.
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("numerobosch", "num_bosch"),
    ("numero_bosch", "num_bosch"),
    ("bosch", "num_bosch"),
    ("part_number", "num_bosch"),
    ("modelo", "modelo_ecu"),
    ("ecu", "modelo_ecu"),
    ("model_name", "modelo_ecu"),
    ("fabricanteecu", "fabricante"),
    ("manufacturer", "fabricante"),
];

/// Fallback keyword for each canonical column, matched as a substring.
const COLUMN_KEYWORDS: [&str; 3] = ["bosch", "modelo", "fabricante"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Header names after normalization and alias mapping.
    pub columns: Vec<String>,
    /// Non-blank data lines seen after quote stripping.
    pub lines_read: u64,
    /// Rows that could not be parsed or had too many fields.
    pub malformed: u64,
    /// Rows missing a part number or model.
    pub incomplete: u64,
    pub duplicates: u64,
    pub written: u64,
}

/// A cleaned row in canonical column order.
pub type CleanRow = [String; 3];

/// Strip quote damage from every line and drop blank ones.
pub fn strip_quotes(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            line.replace("\",", ",")
                .replace(",\"", ",")
                .replace('"', "")
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trim, lowercase and underscore a header, then apply the alias table.
pub fn normalize_header(name: &str) -> String {
    let normalized = name.trim().to_lowercase().replace(' ', "_");
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(normalized)
}

/// Pick the source column for each canonical field: exact name matches
/// first, then the first free column containing the field's keyword.
/// A source column feeds at most one field.
fn select_columns(headers: &[String]) -> [Option<usize>; 3] {
    let mut selected: [Option<usize>; 3] = [None; 3];
    for (slot, canonical) in CANONICAL_HEADER.iter().enumerate() {
        selected[slot] = headers.iter().position(|h| h == canonical);
    }
    for (slot, keyword) in COLUMN_KEYWORDS.iter().enumerate() {
        if selected[slot].is_some() {
            continue;
        }
        selected[slot] = headers
            .iter()
            .enumerate()
            .find(|(i, h)| h.contains(keyword) && !selected.contains(&Some(*i)))
            .map(|(i, _)| i);
    }
    selected
}

/// Clean raw CSV text into canonical rows.
pub fn clean_csv(raw: &str) -> (Vec<CleanRow>, CleanReport) {
    let text = strip_quotes(raw);
    let mut report = CleanReport::default();

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match rdr.headers() {
        Ok(h) => h.iter().map(normalize_header).collect(),
        Err(_) => return (Vec::new(), report),
    };
    let [part_col, model_col, maker_col] = select_columns(&headers);
    report.columns = headers.clone();

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut rows = Vec::new();

    for result in rdr.records() {
        report.lines_read += 1;
        let record = match result {
            Ok(r) if r.len() <= headers.len() => r,
            _ => {
                report.malformed += 1;
                continue;
            }
        };

        let field = |col: Option<usize>| -> String {
            col.and_then(|i| record.get(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };
        let part = field(part_col);
        let model = field(model_col);
        if part.is_empty() || model.is_empty() {
            report.incomplete += 1;
            continue;
        }

        if !seen.insert((part.clone(), model.clone())) {
            report.duplicates += 1;
            continue;
        }
        rows.push([part, model, field(maker_col)]);
    }

    report.written = rows.len() as u64;
    (rows, report)
}

/// Clean `input` and write the result to `output` atomically.
///
/// Only failing to read `input` or write `output` is an error; invalid
/// UTF-8 is replaced and bad rows are dropped.
pub fn clean_file(input: &Path, output: &Path) -> Result<CleanReport> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let raw = String::from_utf8_lossy(&bytes);
    let (rows, report) = clean_csv(&raw);

    reconcile::write_atomic(output, |file| {
        let mut wtr = csv::Writer::from_writer(file);
        wtr.write_record(CANONICAL_HEADER)?;
        for row in &rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    })?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        written = report.written,
        malformed = report.malformed,
        incomplete = report.incomplete,
        duplicates = report.duplicates,
        "cleanup finished"
    );
    Ok(report)
}
