use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

use caseqa_core::config::{AppConfig, RetrievalConfig};
use caseqa_core::expand::{expand, Synonyms};
use caseqa_core::traits::VectorStore;
use caseqa_core::types::Hit;

/// Nearest-neighbour retrieval over every expanded query variant, merged to
/// the closest hit per case.
pub struct Retriever<S> where S: VectorStore {
    store: S,
    retrieval: RetrievalConfig,
    synonyms: Synonyms,
}

impl<S> Retriever<S> where S: VectorStore {
    pub fn new(store: S, config: &AppConfig) -> Self {
        Self { store, retrieval: config.retrieval.clone(), synonyms: config.synonyms.clone() }
    }

    /// One query for `query`, up to `k` hits in store order.
    pub fn retrieve(&self, query: &str) -> Result<Vec<Hit>> {
        let mut hits = self.store.query(query, self.retrieval.k)?;
        hits.truncate(self.retrieval.k);
        Ok(hits)
    }

    /// Minimum distance per id across all variants, ascending.
    pub fn search_and_merge(&self, raw_query: &str) -> Result<Vec<Hit>> {
        let variants = expand(raw_query, &self.synonyms);
        debug!("Searching {} variant(s): {:?}", variants.len(), variants);
        let mut by_id: HashMap<String, Hit> = HashMap::new();
        for variant in &variants {
            for h in self.retrieve(variant)? {
                match by_id.get(&h.id) {
                    Some(kept) if kept.distance <= h.distance => {}
                    _ => { by_id.insert(h.id.clone(), h); }
                }
            }
        }
        let mut merged: Vec<Hit> = by_id.into_values().collect();
        merged.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.id.cmp(&b.id)));
        Ok(merged)
    }
}
