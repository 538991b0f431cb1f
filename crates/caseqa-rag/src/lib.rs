pub mod ingest;
pub mod retrieval;

pub use ingest::{load_collection, prepare_documents, prepare_from_table};
pub use retrieval::Retriever;
