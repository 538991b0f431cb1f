use crate::types::{Hit, IndexedDocument};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// The only two operations the pipeline needs from a vector database.
///
/// Implementations own their embedding function: documents and query text
/// go in as strings.
pub trait VectorStore: Send + Sync {
    /// Replace the whole collection with `docs`. Returns the document count
    /// after loading.
    fn upsert(&self, docs: &[IndexedDocument]) -> anyhow::Result<usize>;

    /// Up to `k` nearest documents to `text`, ascending by distance.
    fn query(&self, text: &str, k: usize) -> anyhow::Result<Vec<Hit>>;
}

impl<T: VectorStore + ?Sized> VectorStore for &T {
    fn upsert(&self, docs: &[IndexedDocument]) -> anyhow::Result<usize> {
        (**self).upsert(docs)
    }

    fn query(&self, text: &str, k: usize) -> anyhow::Result<Vec<Hit>> {
        (**self).query(text, k)
    }
}
