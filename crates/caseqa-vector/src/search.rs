use anyhow::{anyhow, Result};
use arrow_array::{Float32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType};

use caseqa_core::config::Metric;
use caseqa_core::types::{Hit, Meta};

use crate::table::table_exists;

pub fn distance_type(metric: Metric) -> DistanceType {
	match metric {
		Metric::Cosine => DistanceType::Cosine,
		Metric::L2 => DistanceType::L2,
		Metric::Ip => DistanceType::Dot,
	}
}

/// Up to `k` rows nearest to `query_vec`, in the order LanceDB returns them
/// (ascending `_distance`).
pub async fn nearest(conn: &Connection, table_name: &str, query_vec: Vec<f32>, k: usize, metric: Metric) -> Result<Vec<Hit>> {
	if !table_exists(conn, table_name).await? { return Ok(Vec::new()); }
	let table = conn.open_table(table_name).execute().await?;
	let batches: Vec<RecordBatch> = table
		.vector_search(query_vec)?
		.distance_type(distance_type(metric))
		.limit(k)
		.execute()
		.await?
		.try_collect()
		.await?;

	let mut hits = Vec::new();
	for batch in &batches {
		let ids = string_column(batch, "id")?;
		let documents = string_column(batch, "document")?;
		let metadata = string_column(batch, "metadata")?;
		let distances = batch
			.column_by_name("_distance")
			.and_then(|c| c.as_any().downcast_ref::<Float32Array>())
			.ok_or_else(|| anyhow!("search result has no _distance column"))?;
		for i in 0..batch.num_rows() {
			let metadata: Meta = serde_json::from_str(metadata.value(i))?;
			hits.push(Hit {
				id: ids.value(i).to_string(),
				document: documents.value(i).to_string(),
				distance: distances.value(i),
				metadata,
			});
		}
	}
	hits.truncate(k);
	Ok(hits)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch
		.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<StringArray>())
		.ok_or_else(|| anyhow!("search result has no utf8 '{}' column", name))
}
