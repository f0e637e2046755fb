use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Row layout of the knowledge table. `metadata` holds the full metadata
/// object as JSON; `category` is duplicated as a column for filtering.
pub fn build_arrow_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("content", DataType::Utf8, false),
		Field::new("category", DataType::Utf8, false),
		Field::new("doc_type", DataType::Utf8, false),
		Field::new("metadata", DataType::Utf8, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}
