use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Collection table layout. `metadata` holds the document's metadata map as a
/// JSON object so arbitrary `m_<field>` keys survive without schema changes.
pub fn build_arrow_schema(dim: usize) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("document", DataType::Utf8, false),
		Field::new("metadata", DataType::Utf8, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim as i32), true),
	]))
}
