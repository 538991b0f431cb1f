//! Domain types shared by the ingestion pipeline, the vector store and the
//! retrieval engine.

use std::collections::BTreeMap;

pub type CaseId = String;
pub type Meta = BTreeMap<String, String>;

/// Metadata key that carries the case identifier on every indexed document.
pub const ID_META_KEY: &str = "id_caso";

/// Metadata key under which a text field's cleaned value is stored.
pub fn field_meta_key(field: &str) -> String {
    format!("m_{field}")
}

/// One usable row of the source table after cleaning and identifier fixes.
///
/// - `id`: unique identifier (possibly rewritten as `<id>__<row>`)
/// - `fields`: cleaned text-field values, in configured order
/// - `document`: the fields joined with `". "` and trimmed; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRecord {
    pub id: CaseId,
    pub fields: Vec<(String, String)>,
    pub document: String,
}

impl CaseRecord {
    pub fn into_document(self) -> IndexedDocument {
        let mut metadata = Meta::new();
        metadata.insert(ID_META_KEY.to_string(), self.id.clone());
        for (name, value) in self.fields {
            metadata.insert(field_meta_key(&name), value);
        }
        IndexedDocument { id: self.id, document: self.document, metadata }
    }
}

/// The unit written to the vector collection. The embedding is computed by
/// the store's embedder at insert time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    pub id: CaseId,
    pub document: String,
    pub metadata: Meta,
}

/// A single nearest-neighbour result. Smaller `distance` is closer.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: CaseId,
    pub document: String,
    pub distance: f32,
    pub metadata: Meta,
}

impl Hit {
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub id: CaseId,
    /// Distance rounded to four decimal places.
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<Source>,
}
