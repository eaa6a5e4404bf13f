//! Flattening of nested selection sets into named models.
//!
//! Every non-leaf field and inline fragment becomes a [`FlattenModel`] listed in
//! its operation's or fragment's `inner_models`. Fields refer to the model of their
//! selection by name, so target languages without nested anonymous types can declare
//! one type per model.

use crate::directives::DirectiveUsage;
use crate::document::Document;
use crate::document::Fragment;
use crate::document::Operation;
use crate::document::OperationType;
use crate::document::Variable;
use crate::selection::SelectionSet;
use crate::selection::SelectionSetField;
use crate::selection::SelectionSetFragmentSpread;
use crate::selection::SelectionSetInlineFragment;
use crate::selection::SelectionSetItem;
use crate::ty::TypeReference;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenDocument {
    pub fragments: Vec<FlattenFragment>,
    pub operations: Vec<FlattenOperation>,
    pub has_fragments: bool,
    pub has_operations: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenOperation {
    pub name: Option<String>,
    #[serde(flatten)]
    pub operation_type: OperationType,
    pub variables: Vec<Variable>,
    pub has_variables: bool,
    pub document: String,
    #[serde(flatten)]
    pub selection: FlattenSelection,
    pub inner_models: Vec<FlattenModel>,
    pub has_inner_models: bool,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenFragment {
    pub name: String,
    pub on_type: String,
    pub document: String,
    #[serde(flatten)]
    pub selection: FlattenSelection,
    pub inner_models: Vec<FlattenModel>,
    pub has_inner_models: bool,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

/// The selection of one nested field or inline fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenModel {
    /// Name of the model, unique within its operation or fragment
    pub model_type: String,
    /// The schema type the selection applies to
    pub schema_base_type: String,
    #[serde(flatten)]
    pub selection: FlattenSelection,
}

/// One level of a selection set, with nested selections replaced by model names
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenSelection {
    pub fields: Vec<FlattenField>,
    pub fragments_spread: Vec<SelectionSetFragmentSpread>,
    pub inline_fragments: Vec<FlattenInlineFragment>,
    pub has_fields: bool,
    pub has_fragments_spread: bool,
    pub has_inline_fragments: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenField {
    pub name: String,
    pub alias: Option<String>,
    #[serde(flatten)]
    pub ty: TypeReference,
    pub is_leaf: bool,
    /// The model of this field's selection, `None` for leaf fields
    pub model_type: Option<String>,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenInlineFragment {
    pub on_type: String,
    pub model_type: String,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

impl FlattenModel {
    pub fn fields(&self) -> &[FlattenField] {
        &self.selection.fields
    }
}

/// Flatten every operation and fragment of `document`
pub fn flatten_document(document: &Document) -> FlattenDocument {
    let fragments: Vec<_> = document.fragments.iter().map(flatten_fragment).collect();
    let operations: Vec<_> = document.operations.iter().map(flatten_operation).collect();
    FlattenDocument {
        has_fragments: !fragments.is_empty(),
        has_operations: !operations.is_empty(),
        fragments,
        operations,
    }
}

pub fn flatten_operation(operation: &Operation) -> FlattenOperation {
    let mut models = ModelCollector::default();
    let selection = models.selection(&operation.selection_set);
    FlattenOperation {
        name: operation.name.clone(),
        operation_type: operation.operation_type,
        variables: operation.variables.clone(),
        has_variables: operation.has_variables,
        document: operation.document.clone(),
        selection,
        has_inner_models: !models.models.is_empty(),
        inner_models: models.models,
        directives: operation.directives.clone(),
    }
}

pub fn flatten_fragment(fragment: &Fragment) -> FlattenFragment {
    let mut models = ModelCollector::default();
    let selection = models.selection(&fragment.selection_set);
    FlattenFragment {
        name: fragment.name.clone(),
        on_type: fragment.on_type.clone(),
        document: fragment.document.clone(),
        selection,
        has_inner_models: !models.models.is_empty(),
        inner_models: models.models,
        directives: fragment.directives.clone(),
    }
}

/// Models of one operation or fragment, in pre-order
#[derive(Default)]
struct ModelCollector {
    models: Vec<FlattenModel>,
    names: HashSet<String>,
}

impl ModelCollector {
    fn selection(&mut self, selection_set: &SelectionSet) -> FlattenSelection {
        let mut selection = FlattenSelection::default();
        for item in selection_set.items() {
            match item {
                SelectionSetItem::Field(field) => {
                    let field = self.field(field);
                    selection.fields.push(field)
                }
                SelectionSetItem::FragmentSpread(spread) => {
                    selection.fragments_spread.push(spread.clone())
                }
                SelectionSetItem::InlineFragment(inline) => {
                    let inline = self.inline_fragment(inline);
                    selection.inline_fragments.push(inline)
                }
            }
        }
        selection.has_fields = !selection.fields.is_empty();
        selection.has_fragments_spread = !selection.fragments_spread.is_empty();
        selection.has_inline_fragments = !selection.inline_fragments.is_empty();
        selection
    }

    fn field(&mut self, field: &SelectionSetField) -> FlattenField {
        let model_type = (!field.is_leaf()).then(|| {
            let mut base_name = pascal_case(field.response_key());
            if base_name.is_empty() {
                // keys made only of underscores
                base_name = pascal_case(&field.ty.name);
            }
            self.model(base_name, &field.ty.name, &field.selection_set)
        });
        FlattenField {
            name: field.name.clone(),
            alias: field.alias.clone(),
            ty: field.ty.clone(),
            is_leaf: field.is_leaf(),
            model_type,
            directives: field.directives.clone(),
        }
    }

    fn inline_fragment(&mut self, inline: &SelectionSetInlineFragment) -> FlattenInlineFragment {
        let model_type = self.model(
            format!("On{}", inline.on_type),
            &inline.on_type,
            &inline.selection_set,
        );
        FlattenInlineFragment {
            on_type: inline.on_type.clone(),
            model_type,
            directives: inline.directives.clone(),
        }
    }

    /// Add a model for `selection_set` ahead of the models nested in it
    fn model(
        &mut self,
        base_name: String,
        schema_base_type: &str,
        selection_set: &SelectionSet,
    ) -> String {
        let model_type = self.unique_name(base_name);
        let index = self.models.len();
        self.models.push(FlattenModel {
            model_type: model_type.clone(),
            schema_base_type: schema_base_type.to_owned(),
            selection: FlattenSelection::default(),
        });
        let selection = self.selection(selection_set);
        self.models[index].selection = selection;
        model_type
    }

    fn unique_name(&mut self, base_name: String) -> String {
        let mut name = base_name.clone();
        let mut suffix = 0;
        while self.names.contains(&name) {
            suffix += 1;
            name = format!("{base_name}_{suffix}");
        }
        self.names.insert(name.clone());
        name
    }
}

/// `first_name` and `firstName` both become `FirstName`
fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
