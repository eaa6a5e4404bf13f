#![doc = include_str!("../README.md")]

pub mod directives;
pub mod document;
mod error;
pub mod field;
pub mod flatten;
pub mod generator;
pub mod schema;
pub mod selection;
pub mod ty;

pub use self::document::Document;
pub use self::error::InvalidSelectionReason;
pub use self::error::NormalizeError;
pub use self::generator::generate;
pub use self::schema::SchemaTemplateContext;
pub use self::selection::SelectionSet;
pub use self::selection::SelectionSetItem;
pub use self::ty::TypeCatalog;
pub use self::ty::TypeReference;

use apollo_compiler::validation::Valid;
use apollo_compiler::ExecutableDocument;
use apollo_compiler::Schema;

/// Normalize a schema into the records handed to templates.
///
/// Normalizing the same schema twice produces equal contexts.
pub fn normalize_schema(schema: &Valid<Schema>) -> Result<SchemaTemplateContext, NormalizeError> {
    SchemaTemplateContext::new(schema)
}

/// Normalize the operations and fragments of `documents` and merge them into one [`Document`].
///
/// Later documents override fragments of the same name defined by earlier ones.
pub fn normalize_documents<'doc>(
    schema: &Valid<Schema>,
    documents: impl IntoIterator<Item = &'doc ExecutableDocument>,
) -> Result<Document, NormalizeError> {
    Document::new(schema, documents)
}
