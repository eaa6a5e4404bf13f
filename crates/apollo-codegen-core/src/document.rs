//! Operations and fragments of one or more executable documents, merged into one [`Document`]

use crate::directives::value_to_json;
use crate::directives::DirectiveUsage;
use crate::selection::SelectionSet;
use crate::selection::SelectionSetFragmentSpread;
use crate::selection::SelectionSetItem;
use crate::ty::TypeCatalog;
use crate::ty::TypeReference;
use crate::NormalizeError;
use apollo_compiler::ast;
use apollo_compiler::executable;
use apollo_compiler::validation::Valid;
use apollo_compiler::ExecutableDocument;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::Serializer;
use serde_json_bytes::Value as JsonValue;

/// The kind of an operation.
///
/// Serializes as `operationType` (`"query"`, `"mutation"` or `"subscription"`)
/// together with the booleans `isQuery`, `isMutation` and `isSubscription`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl From<ast::OperationType> for OperationType {
    fn from(operation_type: ast::OperationType) -> Self {
        match operation_type {
            ast::OperationType::Query => Self::Query,
            ast::OperationType::Mutation => Self::Mutation,
            ast::OperationType::Subscription => Self::Subscription,
        }
    }
}

impl serde::Serialize for OperationType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut flags = serializer.serialize_struct("OperationType", 4)?;
        flags.serialize_field("operationType", self.name())?;
        flags.serialize_field("isQuery", &(*self == Self::Query))?;
        flags.serialize_field("isMutation", &(*self == Self::Mutation))?;
        flags.serialize_field("isSubscription", &(*self == Self::Subscription))?;
        flags.end()
    }
}

/// A variable definition of an operation
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(flatten)]
    pub ty: TypeReference,
    pub default_value: Option<JsonValue>,
}

/// A named fragment definition
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub name: String,
    pub on_type: String,
    #[serde(flatten)]
    pub selection_set: SelectionSet,
    /// Source text of the fragment definition
    pub document: String,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// `None` for an anonymous operation
    pub name: Option<String>,
    #[serde(flatten)]
    pub operation_type: OperationType,
    pub variables: Vec<Variable>,
    pub has_variables: bool,
    #[serde(flatten)]
    pub selection_set: SelectionSet,
    /// Source text of the operation definition
    pub document: String,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

impl Operation {
    pub fn is_query(&self) -> bool {
        self.operation_type == OperationType::Query
    }

    pub fn is_mutation(&self) -> bool {
        self.operation_type == OperationType::Mutation
    }

    pub fn is_subscription(&self) -> bool {
        self.operation_type == OperationType::Subscription
    }
}

/// Fragments and operations of a set of executable documents.
///
/// Fragments are unique by name. When several documents define a fragment
/// with the same name, the definition from the document that comes last wins
/// and takes the position of that last definition.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub fragments: Vec<Fragment>,
    pub operations: Vec<Operation>,
    pub has_fragments: bool,
    pub has_operations: bool,
}

impl Document {
    /// Normalize and merge `documents`, in order.
    pub fn new<'doc>(
        schema: &Valid<Schema>,
        documents: impl IntoIterator<Item = &'doc ExecutableDocument>,
    ) -> Result<Self, NormalizeError> {
        Self::with_catalog(&TypeCatalog::new(schema), documents)
    }

    /// Like [`new`][Self::new], reusing a catalog built for the same schema
    pub fn with_catalog<'doc>(
        catalog: &TypeCatalog,
        documents: impl IntoIterator<Item = &'doc ExecutableDocument>,
    ) -> Result<Self, NormalizeError> {
        let mut fragments = IndexMap::<String, Fragment>::new();
        let mut operations = Vec::new();
        for document in documents {
            for fragment in document.fragments.values() {
                let fragment = normalize_fragment(catalog, document, fragment)?;
                if fragments.shift_remove(&fragment.name).is_some() {
                    tracing::debug!(
                        fragment = %fragment.name,
                        "fragment redefined by a later document, keeping the later definition"
                    );
                }
                fragments.insert(fragment.name.clone(), fragment);
            }
            for operation in document.operations.iter() {
                operations.push(normalize_operation(catalog, document, operation)?);
            }
        }
        let fragments: Vec<Fragment> = fragments.into_values().collect();
        tracing::debug!(
            fragments = fragments.len(),
            operations = operations.len(),
            "normalized documents"
        );
        Ok(Self {
            has_fragments: !fragments.is_empty(),
            has_operations: !operations.is_empty(),
            fragments,
            operations,
        })
    }

    pub fn fragment(&self, name: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|fragment| fragment.name == name)
    }

    /// Returns the operation with the given name.
    /// `None` selects the anonymous operation.
    pub fn operation(&self, name: Option<&str>) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|operation| operation.name.as_deref() == name)
    }

    /// Returns the fragment a spread refers to
    pub fn resolve_spread(
        &self,
        spread: &SelectionSetFragmentSpread,
    ) -> Result<&Fragment, NormalizeError> {
        self.fragment(&spread.fragment_name)
            .ok_or_else(|| NormalizeError::UnresolvedFragment {
                name: spread.fragment_name.clone(),
            })
    }

    /// Checks that every fragment spread, at any depth, refers to a fragment of this document
    pub fn verify_spreads(&self) -> Result<(), NormalizeError> {
        let selection_sets = self
            .fragments
            .iter()
            .map(|fragment| &fragment.selection_set)
            .chain(self.operations.iter().map(|op| &op.selection_set));
        for selection_set in selection_sets {
            self.verify_selection_set(selection_set)?
        }
        Ok(())
    }

    fn verify_selection_set(&self, selection_set: &SelectionSet) -> Result<(), NormalizeError> {
        for item in selection_set.items() {
            match item {
                SelectionSetItem::Field(field) => self.verify_selection_set(&field.selection_set)?,
                SelectionSetItem::InlineFragment(inline) => {
                    self.verify_selection_set(&inline.selection_set)?
                }
                SelectionSetItem::FragmentSpread(spread) => {
                    self.resolve_spread(spread)?;
                }
            }
        }
        Ok(())
    }
}

fn normalize_fragment(
    catalog: &TypeCatalog,
    document: &ExecutableDocument,
    fragment: &Node<executable::Fragment>,
) -> Result<Fragment, NormalizeError> {
    tracing::trace!(fragment = %fragment.name, "normalizing fragment");
    Ok(Fragment {
        name: fragment.name.to_string(),
        on_type: fragment.selection_set.ty.to_string(),
        selection_set: SelectionSet::build(catalog, &fragment.selection_set)?,
        document: source_text(document, fragment)
            .unwrap_or_else(|| fragment.serialize().to_string()),
        directives: DirectiveUsage::new(fragment.directives.iter()),
    })
}

fn normalize_operation(
    catalog: &TypeCatalog,
    document: &ExecutableDocument,
    operation: &Node<executable::Operation>,
) -> Result<Operation, NormalizeError> {
    tracing::trace!(
        operation = operation.name.as_ref().map_or("<anonymous>", |name| name.as_str()),
        "normalizing operation"
    );
    let variables = operation
        .variables
        .iter()
        .map(|variable| -> Result<Variable, NormalizeError> {
            Ok(Variable {
                name: variable.name.to_string(),
                ty: catalog.classify(&variable.ty)?,
                default_value: variable.default_value.as_ref().map(value_to_json),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Operation {
        name: operation.name.as_ref().map(|name| name.to_string()),
        operation_type: operation.operation_type.into(),
        has_variables: !variables.is_empty(),
        variables,
        selection_set: SelectionSet::build(catalog, &operation.selection_set)?,
        document: source_text(document, operation)
            .unwrap_or_else(|| operation.serialize().to_string()),
        directives: DirectiveUsage::new(operation.directives.iter()),
    })
}

/// The exact source text a parsed node was built from
fn source_text<T>(document: &ExecutableDocument, node: &Node<T>) -> Option<String> {
    let location = node.location()?;
    let file = document.sources.get(&location.file_id())?;
    file.source_text()
        .get(location.offset()..location.end_offset())
        .map(str::to_owned)
}
