use std::collections::HashMap;
use std::sync::Mutex;

use caseqa_core::config::AppConfig;
use caseqa_core::traits::VectorStore;
use caseqa_core::types::{Hit, IndexedDocument, Meta};
use caseqa_rag::Retriever;

/// Answers each query text with a fixed hit list and records what was asked.
#[derive(Default)]
struct ScriptedStore {
    responses: HashMap<String, Vec<Hit>>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl ScriptedStore {
    fn with(mut self, query: &str, hits: Vec<Hit>) -> Self {
        self.responses.insert(query.to_string(), hits);
        self
    }

    fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

impl VectorStore for ScriptedStore {
    fn upsert(&self, docs: &[IndexedDocument]) -> anyhow::Result<usize> {
        Ok(docs.len())
    }

    fn query(&self, text: &str, k: usize) -> anyhow::Result<Vec<Hit>> {
        self.calls.lock().unwrap().push((text.to_string(), k));
        Ok(self.responses.get(text).cloned().unwrap_or_default())
    }
}

fn hit(id: &str, distance: f32) -> Hit {
    Hit { id: id.into(), document: format!("doc {id}"), distance, metadata: Meta::new() }
}

fn config(extra: &str) -> AppConfig {
    let yaml = format!(
        "data_path: x.xlsx\nid_col: ID\ntext_fields: [t]\nchroma: {{ persist_dir: db, collection: c }}\n{extra}"
    );
    AppConfig::from_yaml_str(&yaml).expect("config")
}

#[test]
fn merge_keeps_minimum_distance_per_id() {
    let cfg = config("synonyms:\n  piar: [\"plan individual\"]\n");
    let store = ScriptedStore::default()
        .with("necesita piar", vec![hit("x", 0.9)])
        .with("plan individual", vec![hit("x", 0.3)]);
    let retriever = Retriever::new(&store, &cfg);

    let merged = retriever.search_and_merge("Necesita PIAR").expect("search");
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].id, "x");
    assert!((merged[0].distance - 0.3).abs() < f32::EPSILON);
}

#[test]
fn merged_pool_is_sorted_ascending() {
    let cfg = config("synonyms:\n  acoso: [\"bullying\"]\n");
    let store = ScriptedStore::default()
        .with("acoso", vec![hit("a", 0.5), hit("b", 0.6), hit("c", 0.8)])
        .with("bullying", vec![hit("c", 0.1), hit("d", 0.55), hit("a", 0.7)]);
    let retriever = Retriever::new(&store, &cfg);

    let merged = retriever.search_and_merge("acoso").expect("search");
    let order: Vec<(&str, f32)> = merged.iter().map(|h| (h.id.as_str(), h.distance)).collect();
    assert_eq!(order, vec![("c", 0.1), ("a", 0.5), ("d", 0.55), ("b", 0.6)]);
}

#[test]
fn one_query_per_variant_with_configured_k() {
    let cfg = config("retrieval: { k: 7 }\nsynonyms:\n  piar: [\"plan individual\", \"PIAR\"]\n");
    let store = ScriptedStore::default();
    let retriever = Retriever::new(&store, &cfg);

    let merged = retriever.search_and_merge("  PIAR ").expect("search");
    assert!(merged.is_empty());
    let mut calls = store.calls();
    calls.sort();
    assert_eq!(calls, vec![("piar".to_string(), 7), ("plan individual".to_string(), 7)]);
}

#[test]
fn retrieve_caps_results_at_k() {
    let cfg = config("retrieval: { k: 2 }\n");
    let store = ScriptedStore::default().with("q", vec![hit("1", 0.1), hit("2", 0.2), hit("3", 0.3)]);
    let retriever = Retriever::new(&store, &cfg);
    let hits = retriever.retrieve("q").expect("retrieve");
    assert_eq!(hits.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(), vec!["1", "2"]);
}
