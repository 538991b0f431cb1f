//! LanceDB-backed collection of case documents.
//!
//! [`LanceStore`] is addressed by (persist dir, collection, metric, embedder)
//! and exposes the synchronous [`VectorStore`] seam by blocking on its own
//! current-thread runtime.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use caseqa_core::config::{AppConfig, Metric};
use caseqa_core::error::Error;
use caseqa_core::traits::{Embedder, VectorStore};
use caseqa_core::types::{Hit, IndexedDocument};

pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

const EMBED_BATCH: usize = 64;

pub struct LanceStore {
	rt: Runtime,
	db: Connection,
	persist_dir: PathBuf,
	table_name: String,
	metric: Metric,
	embedder: Box<dyn Embedder>,
}

impl LanceStore {
	/// Open (creating the directory and an empty collection if needed).
	pub fn open(persist_dir: &Path, collection: &str, metric: Metric, embedder: Box<dyn Embedder>) -> Result<Self> {
		std::fs::create_dir_all(persist_dir)
			.with_context(|| format!("creating persist dir {}", persist_dir.display()))?;
		let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
		let uri = persist_dir.to_string_lossy().to_string();
		let db = rt.block_on(table::open_db(&uri)).map_err(|e| Error::Store(e.to_string()))?;
		let schema = schema::build_arrow_schema(embedder.dim());
		rt.block_on(table::ensure_table(&db, collection, schema))?;
		debug!("Opened collection '{}' at {} (metric={:?}, dim={})", collection, uri, metric, embedder.dim());
		Ok(Self { rt, db, persist_dir: persist_dir.to_path_buf(), table_name: collection.to_string(), metric, embedder })
	}

	pub fn from_config(config: &AppConfig, embedder: Box<dyn Embedder>) -> Result<Self> {
		Self::open(&config.persist_dir(), &config.store.collection, config.store.metric, embedder)
	}

	pub fn persist_dir(&self) -> &Path { &self.persist_dir }

	pub fn collection(&self) -> &str { &self.table_name }

	pub fn count(&self) -> Result<usize> {
		self.rt.block_on(table::count_rows(&self.db, &self.table_name))
	}

	pub fn peek(&self, n: usize) -> Result<Vec<String>> {
		self.rt.block_on(table::peek_ids(&self.db, &self.table_name, n))
	}

	pub fn table_names(&self) -> Result<Vec<String>> {
		Ok(self.rt.block_on(self.db.table_names().execute())?)
	}

	fn embed_documents(&self, docs: &[IndexedDocument]) -> Result<Vec<Vec<f32>>> {
		let pb = ProgressBar::new(docs.len() as u64);
		if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} docs ({percent}%)") {
			pb.set_style(style.progress_chars("#>-"));
		}
		let mut embeddings = Vec::with_capacity(docs.len());
		for chunk in docs.chunks(EMBED_BATCH) {
			let texts: Vec<String> = chunk.iter().map(|d| d.document.clone()).collect();
			embeddings.extend(self.embedder.embed_batch(&texts)?);
			pb.inc(chunk.len() as u64);
		}
		pb.finish_and_clear();
		Ok(embeddings)
	}
}

impl VectorStore for LanceStore {
	fn upsert(&self, docs: &[IndexedDocument]) -> Result<usize> {
		self.rt.block_on(table::clear_table(&self.db, &self.table_name));
		let embeddings = self.embed_documents(docs)?;
		let written = self.rt.block_on(writer::insert_documents(&self.db, &self.table_name, self.embedder.dim(), docs, &embeddings))?;
		info!("Inserted {} documents into '{}'", written, self.table_name);
		self.count()
	}

	fn query(&self, text: &str, k: usize) -> Result<Vec<Hit>> {
		let query_vec = self.embedder.embed_batch(&[text.to_string()])?.into_iter().next()
			.ok_or_else(|| anyhow::anyhow!("embedder returned no vector for the query"))?;
		let hits = self.rt.block_on(search::nearest(&self.db, &self.table_name, query_vec, k, self.metric))?;
		debug!("raw_hits={} for {:?}", hits.len(), text);
		Ok(hits)
	}
}
