//! In-memory source table and the workbook loader that fills it.

use calamine::{open_workbook_auto, Data, Reader};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::error::Error;

/// A rectangular table of optional string cells. Row position is the
/// positional index used for synthesized and disambiguated identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SourceTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Read the first worksheet of an `.xlsx`/`.xls`/`.ods` workbook. The first
    /// row holds the column names.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let read_err = |reason: String| Error::SourceRead { path: path.display().to_string(), reason };
        let mut workbook = open_workbook_auto(path).map_err(|e| read_err(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| read_err("workbook has no worksheets".to_string()))?
            .map_err(|e| read_err(e.to_string()))?;

        let mut rows = range.rows();
        let columns: Vec<String> = match rows.next() {
            Some(header) => dedupe_columns(
                header
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| cell_to_string(cell).unwrap_or_else(|| format!("Unnamed: {i}")))
                    .collect(),
            ),
            None => return Ok(Self::default()),
        };
        let body = rows
            .map(|row| (0..columns.len()).map(|i| row.get(i).and_then(cell_to_string)).collect())
            .collect();
        Ok(Self { columns, rows: body })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).and_then(|c| c.as_deref())
    }
}

/// Repeated header names get a `.N` suffix (`X`, `X.1`, `X.2`). A suffixed
/// name that is itself taken gets suffixed again (`X.1.1`).
fn dedupe_columns(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut n = counts.get(&candidate).copied().unwrap_or(0);
        while n > 0 {
            counts.insert(candidate.clone(), n + 1);
            candidate = format!("{candidate}.{n}");
            n = counts.get(&candidate).copied().unwrap_or(0);
        }
        if candidate != name {
            warn!("Duplicate column '{}' renamed to '{}'", name, candidate);
        }
        counts.insert(candidate.clone(), n + 1);
        out.push(candidate);
    }
    out
}

/// Render a cell the way a spreadsheet user would read it. Dates print as
/// `YYYY-MM-DD HH:MM:SS`; empty and error cells are absent.
fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::DateTime(dt) if dt.is_datetime() => Some(match dt.as_datetime() {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        }),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
