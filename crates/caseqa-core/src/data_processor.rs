use std::collections::HashSet;
use tracing::{info, warn};

use crate::error::Error;
use crate::sheet::SourceTable;
use crate::text::clean;
use crate::types::CaseRecord;

/// Column settings the processor needs from the config.
#[derive(Debug, Clone)]
pub struct RecordLayout {
    pub id_col: String,
    pub text_fields: Vec<String>,
}

impl RecordLayout {
    pub fn new(id_col: impl Into<String>, text_fields: Vec<String>) -> Self {
        Self { id_col: id_col.into(), text_fields }
    }
}

/// Turns a raw source table into indexable case records: cleans text fields,
/// derives unique identifiers, builds composite documents.
pub struct CaseProcessor {
    layout: RecordLayout,
}

impl CaseProcessor {
    pub fn new(layout: RecordLayout) -> Self { Self { layout } }

    pub fn process(&self, table: &SourceTable) -> Result<Vec<CaseRecord>, Error> {
        let fields = self.cleaned_fields(table);
        let ids = self.identifiers(table);

        let mut records = Vec::with_capacity(table.len());
        for (row, id) in ids.into_iter().enumerate() {
            let values: Vec<&str> = fields.iter().map(|col| col[row].as_str()).collect();
            let document = values.join(". ").trim().to_string();
            if document.is_empty() { continue; }
            let named = self.layout.text_fields.iter().cloned().zip(values.iter().map(|v| v.to_string())).collect();
            records.push(CaseRecord { id, fields: named, document });
        }

        if records.is_empty() {
            let mut columns = table.columns.clone();
            for name in self.layout.text_fields.iter().chain(std::iter::once(&self.layout.id_col)) {
                if !columns.contains(name) { columns.push(name.clone()); }
            }
            return Err(Error::NoUsableRows { columns });
        }
        info!("Prepared {} of {} rows for indexing", records.len(), table.len());
        Ok(records)
    }

    /// One cleaned column per configured text field; missing columns become empty.
    fn cleaned_fields(&self, table: &SourceTable) -> Vec<Vec<String>> {
        self.layout
            .text_fields
            .iter()
            .map(|name| match table.column_index(name) {
                Some(col) => (0..table.len()).map(|row| clean(table.cell(row, col))).collect(),
                None => {
                    warn!("Column '{}' does not exist; creating it empty", name);
                    vec![String::new(); table.len()]
                }
            })
            .collect()
    }

    /// Identifiers as strings. A single duplicate renames every row to
    /// `<id>__<row>`.
    fn identifiers(&self, table: &SourceTable) -> Vec<String> {
        let mut ids: Vec<String> = match table.column_index(&self.layout.id_col) {
            Some(col) => (0..table.len()).map(|row| table.cell(row, col).unwrap_or("nan").to_string()).collect(),
            None => {
                warn!("id_col '{}' does not exist; using the row index as ID", self.layout.id_col);
                (0..table.len()).map(|row| row.to_string()).collect()
            }
        };
        let mut seen = HashSet::with_capacity(ids.len());
        let has_duplicates = !ids.iter().all(|id| seen.insert(id.as_str()));
        if has_duplicates {
            warn!("Duplicate values in id_col '{}'; suffixing every ID with its row index", self.layout.id_col);
            for (row, id) in ids.iter_mut().enumerate() {
                *id = format!("{id}__{row}");
            }
        }
        ids
    }
}
