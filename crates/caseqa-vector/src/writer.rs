use anyhow::{anyhow, ensure, Result};
use arrow_array::{Array, FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use lancedb::Connection;
use std::sync::Arc;

use caseqa_core::types::IndexedDocument;

use crate::schema::build_arrow_schema;
use crate::table::table_exists;

const INSERT_BATCH: usize = 1000;

/// Append documents and their embeddings to `table_name`, creating the table
/// on first insert.
pub async fn insert_documents(
	conn: &Connection,
	table_name: &str,
	dim: usize,
	docs: &[IndexedDocument],
	embeddings: &[Vec<f32>],
) -> Result<usize> {
	ensure!(docs.len() == embeddings.len(), "{} documents but {} embeddings", docs.len(), embeddings.len());
	let mut written = 0usize;
	for (doc_chunk, emb_chunk) in docs.chunks(INSERT_BATCH).zip(embeddings.chunks(INSERT_BATCH)) {
		let batch = docs_to_record_batch(dim, doc_chunk, emb_chunk)?;
		let schema = batch.schema();
		let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);
		if table_exists(conn, table_name).await? {
			conn.open_table(table_name).execute().await?.add(reader).execute().await?;
		} else {
			conn.create_table(table_name, reader).execute().await?;
		}
		written += doc_chunk.len();
	}
	Ok(written)
}

pub fn docs_to_record_batch(dim: usize, docs: &[IndexedDocument], embeddings: &[Vec<f32>]) -> Result<RecordBatch> {
	if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) {
		return Err(anyhow!("embedding has {} dims, table expects {}", bad.len(), dim));
	}
	let ids = StringArray::from_iter_values(docs.iter().map(|d| d.id.as_str()));
	let documents = StringArray::from_iter_values(docs.iter().map(|d| d.document.as_str()));
	let metadata = docs
		.iter()
		.map(|d| serde_json::to_string(&d.metadata))
		.collect::<Result<Vec<_>, _>>()?;
	let vectors = FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(
		embeddings.iter().map(|v| Some(v.iter().copied().map(Some).collect::<Vec<_>>())),
		dim as i32,
	);
	let record_batch = RecordBatch::try_new(build_arrow_schema(dim), vec![
		Arc::new(ids),
		Arc::new(documents),
		Arc::new(StringArray::from(metadata)),
		Arc::new(vectors) as Arc<dyn Array>,
	])?;
	Ok(record_batch)
}
