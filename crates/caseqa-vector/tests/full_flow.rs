use caseqa_core::config::Metric;
use caseqa_core::traits::VectorStore;
use caseqa_core::types::{IndexedDocument, Meta};
use caseqa_embed::FakeEmbedder;
use caseqa_vector::LanceStore;
use tempfile::TempDir;

fn doc(id: &str, text: &str) -> IndexedDocument {
    let mut metadata = Meta::new();
    metadata.insert("id_caso".into(), id.into());
    metadata.insert("m_síntesis".into(), text.into());
    IndexedDocument { id: id.into(), document: text.into(), metadata }
}

fn corpus() -> Vec<IndexedDocument> {
    vec![
        doc("1", "acoso escolar en el aula de sexto grado"),
        doc("2", "plan individual de ajustes razonables para estudiante"),
        doc("3", "reunión con acudientes por inasistencia"),
    ]
}

fn open(tmp: &TempDir) -> LanceStore {
    LanceStore::open(&tmp.path().join("db"), "casos_test", Metric::Cosine, Box::new(FakeEmbedder::new(32))).expect("store")
}

#[test]
fn fresh_collection_is_empty_and_queryable() {
    let tmp = TempDir::new().expect("tmp");
    let store = open(&tmp);
    assert_eq!(store.count().expect("count"), 0);
    assert!(store.query("acoso", 5).expect("query").is_empty());
    assert!(store.table_names().expect("names").contains(&"casos_test".to_string()));
    assert!(tmp.path().join("db").is_dir());
}

#[test]
fn reingest_replaces_instead_of_appending() {
    let tmp = TempDir::new().expect("tmp");
    let store = open(&tmp);
    assert_eq!(store.upsert(&corpus()).expect("first upsert"), 3);
    assert_eq!(store.upsert(&corpus()).expect("second upsert"), 3);
    assert_eq!(store.count().expect("count"), 3);

    let smaller = &corpus()[..1];
    assert_eq!(store.upsert(smaller).expect("third upsert"), 1);
    assert_eq!(store.peek(3).expect("peek"), vec!["1".to_string()]);
}

#[test]
fn query_returns_ascending_distances_with_metadata() {
    let tmp = TempDir::new().expect("tmp");
    let store = open(&tmp);
    store.upsert(&corpus()).expect("upsert");

    let hits = store.query("plan individual de ajustes razonables para estudiante", 2).expect("query");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "2");
    assert!(hits[0].distance < 1e-3, "identical text is at distance ~0, got {}", hits[0].distance);
    assert!(hits[0].distance <= hits[1].distance);
    assert_eq!(hits[0].meta("id_caso"), Some("2"));
    assert_eq!(hits[0].document, "plan individual de ajustes razonables para estudiante");
}

#[test]
fn reopening_sees_persisted_rows() {
    let tmp = TempDir::new().expect("tmp");
    {
        let store = open(&tmp);
        store.upsert(&corpus()).expect("upsert");
    }
    let store = open(&tmp);
    assert_eq!(store.count().expect("count"), 3);
    assert_eq!(store.peek(2).expect("peek").len(), 2);
}
