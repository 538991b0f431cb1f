//! Extract-clean-load of the case spreadsheet into a vector collection.
//!
//! Split in two so the store is only opened once the table has produced at
//! least one usable row.

use anyhow::Result;
use tracing::info;

use caseqa_core::config::AppConfig;
use caseqa_core::data_processor::{CaseProcessor, RecordLayout};
use caseqa_core::sheet::SourceTable;
use caseqa_core::traits::VectorStore;
use caseqa_core::types::IndexedDocument;

/// Read `data_path` and turn its rows into indexable documents.
pub fn prepare_documents(config: &AppConfig) -> Result<Vec<IndexedDocument>> {
    let path = config.data_path();
    info!("Reading source table {}", path.display());
    let table = SourceTable::from_path(&path)?;
    prepare_from_table(config, &table)
}

pub fn prepare_from_table(config: &AppConfig, table: &SourceTable) -> Result<Vec<IndexedDocument>> {
    let layout = RecordLayout::new(config.id_col.clone(), config.text_fields.clone());
    let records = CaseProcessor::new(layout).process(table)?;
    Ok(records.into_iter().map(|r| r.into_document()).collect())
}

/// Full refresh: the store drops whatever it held and loads `docs`.
/// Returns the collection size afterwards.
pub fn load_collection<S: VectorStore>(store: &S, docs: &[IndexedDocument]) -> Result<usize> {
    let count = store.upsert(docs)?;
    info!("Indexed {} documents", count);
    Ok(count)
}
