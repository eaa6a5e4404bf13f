//! Selection sets of operations and fragments as a tree of tagged nodes

use crate::directives::DirectiveUsage;
use crate::error::InvalidSelectionReason;
use crate::ty::TypeCatalog;
use crate::ty::TypeReference;
use crate::NormalizeError;
use apollo_compiler::executable;
use apollo_compiler::executable::Selection;
use serde::ser::SerializeStruct;
use serde::Serialize;
use serde::Serializer;

/// A node of a selection set
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionSetItem {
    Field(SelectionSetField),
    FragmentSpread(SelectionSetFragmentSpread),
    InlineFragment(SelectionSetInlineFragment),
}

/// A field selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSetField {
    pub name: String,
    pub alias: Option<String>,
    #[serde(flatten)]
    pub ty: TypeReference,
    /// Empty for leaf fields
    #[serde(flatten)]
    pub selection_set: SelectionSet,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

/// A `...Name` spread.
///
/// Only the fragment name is recorded: consumers resolve it against
/// [`Document::fragments`][crate::Document::fragments] when they need its contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSetFragmentSpread {
    pub fragment_name: String,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

/// A `... on Type { }` inline fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSetInlineFragment {
    /// The type condition, or the enclosing type if the fragment has none
    pub on_type: String,
    #[serde(flatten)]
    pub selection_set: SelectionSet,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

impl SelectionSetField {
    /// The key of this field in a response: its alias if any, or its name
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Returns whether the field's type is a scalar or an enum,
    /// which are selected without a sub-selection
    pub fn is_leaf(&self) -> bool {
        self.ty.is_leaf()
    }
}

impl SelectionSetItem {
    pub fn is_field(&self) -> bool {
        matches!(self, Self::Field(_))
    }

    pub fn is_fragment_spread(&self) -> bool {
        matches!(self, Self::FragmentSpread(_))
    }

    pub fn is_inline_fragment(&self) -> bool {
        matches!(self, Self::InlineFragment(_))
    }

    /// Only field selections of scalar or enum type are leaves
    pub fn is_leaf(&self) -> bool {
        match self {
            Self::Field(field) => field.is_leaf(),
            Self::FragmentSpread(_) | Self::InlineFragment(_) => false,
        }
    }

    pub fn as_field(&self) -> Option<&SelectionSetField> {
        if let Self::Field(field) = self {
            Some(field)
        } else {
            None
        }
    }

    pub fn as_fragment_spread(&self) -> Option<&SelectionSetFragmentSpread> {
        if let Self::FragmentSpread(spread) = self {
            Some(spread)
        } else {
            None
        }
    }

    pub fn as_inline_fragment(&self) -> Option<&SelectionSetInlineFragment> {
        if let Self::InlineFragment(inline) = self {
            Some(inline)
        } else {
            None
        }
    }

    pub fn directives(&self) -> &DirectiveUsage {
        match self {
            Self::Field(field) => &field.directives,
            Self::FragmentSpread(spread) => &spread.directives,
            Self::InlineFragment(inline) => &inline.directives,
        }
    }
}

impl Serialize for SelectionSetItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Tagged<'a, T> {
            is_field: bool,
            is_fragment_spread: bool,
            is_inline_fragment: bool,
            is_leaf: bool,
            #[serde(flatten)]
            node: &'a T,
        }

        let is_leaf = self.is_leaf();
        let is_field = self.is_field();
        let is_fragment_spread = self.is_fragment_spread();
        let is_inline_fragment = self.is_inline_fragment();
        match self {
            Self::Field(node) => Tagged {
                is_field,
                is_fragment_spread,
                is_inline_fragment,
                is_leaf,
                node,
            }
            .serialize(serializer),
            Self::FragmentSpread(node) => Tagged {
                is_field,
                is_fragment_spread,
                is_inline_fragment,
                is_leaf,
                node,
            }
            .serialize(serializer),
            Self::InlineFragment(node) => Tagged {
                is_field,
                is_fragment_spread,
                is_inline_fragment,
                is_leaf,
                node,
            }
            .serialize(serializer),
        }
    }
}

/// An ordered sequence of selections, with projections by node kind.
///
/// The projections are computed once on construction from the item sequence
/// and cannot be modified separately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    items: Vec<SelectionSetItem>,
    fields: Vec<usize>,
    fragments_spread: Vec<usize>,
    inline_fragments: Vec<usize>,
}

impl From<Vec<SelectionSetItem>> for SelectionSet {
    fn from(items: Vec<SelectionSetItem>) -> Self {
        let mut fields = Vec::new();
        let mut fragments_spread = Vec::new();
        let mut inline_fragments = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match item {
                SelectionSetItem::Field(_) => fields.push(index),
                SelectionSetItem::FragmentSpread(_) => fragments_spread.push(index),
                SelectionSetItem::InlineFragment(_) => inline_fragments.push(index),
            }
        }
        Self {
            items,
            fields,
            fragments_spread,
            inline_fragments,
        }
    }
}

impl SelectionSet {
    /// Normalize a selection set of an executable document.
    ///
    /// Fields and inline fragments are normalized recursively,
    /// each against the type they select from.
    /// Fragment spreads are recorded by name and not followed.
    pub fn build(
        catalog: &TypeCatalog,
        selection_set: &executable::SelectionSet,
    ) -> Result<Self, NormalizeError> {
        let items = selection_set
            .selections
            .iter()
            .map(|selection| build_item(catalog, selection_set, selection))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items.into())
    }

    /// All selections in document order
    pub fn items(&self) -> &[SelectionSetItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &SelectionSetField> {
        self.fields
            .iter()
            .filter_map(|&index| self.items[index].as_field())
    }

    pub fn fragments_spread(&self) -> impl Iterator<Item = &SelectionSetFragmentSpread> {
        self.fragments_spread
            .iter()
            .filter_map(|&index| self.items[index].as_fragment_spread())
    }

    pub fn inline_fragments(&self) -> impl Iterator<Item = &SelectionSetInlineFragment> {
        self.inline_fragments
            .iter()
            .filter_map(|&index| self.items[index].as_inline_fragment())
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn has_fragments_spread(&self) -> bool {
        !self.fragments_spread.is_empty()
    }

    pub fn has_inline_fragments(&self) -> bool {
        !self.inline_fragments.is_empty()
    }

    fn projection<'a>(&'a self, indices: &'a [usize]) -> Projection<'a> {
        Projection {
            items: &self.items,
            indices,
        }
    }
}

/// Serializes the items of a selection set at the given indices
struct Projection<'a> {
    items: &'a [SelectionSetItem],
    indices: &'a [usize],
}

impl Serialize for Projection<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.indices.iter().map(|&index| &self.items[index]))
    }
}

impl Serialize for SelectionSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut set = serializer.serialize_struct("SelectionSet", 7)?;
        set.serialize_field("selectionSet", &self.items)?;
        set.serialize_field("fields", &self.projection(&self.fields))?;
        set.serialize_field("fragmentsSpread", &self.projection(&self.fragments_spread))?;
        set.serialize_field("inlineFragments", &self.projection(&self.inline_fragments))?;
        set.serialize_field("hasFields", &self.has_fields())?;
        set.serialize_field("hasFragmentsSpread", &self.has_fragments_spread())?;
        set.serialize_field("hasInlineFragments", &self.has_inline_fragments())?;
        set.end()
    }
}

fn build_item(
    catalog: &TypeCatalog,
    parent: &executable::SelectionSet,
    selection: &Selection,
) -> Result<SelectionSetItem, NormalizeError> {
    match selection {
        Selection::Field(field) => build_field(catalog, parent, field).map(SelectionSetItem::Field),
        Selection::FragmentSpread(spread) => {
            Ok(SelectionSetItem::FragmentSpread(SelectionSetFragmentSpread {
                fragment_name: spread.fragment_name.to_string(),
                directives: DirectiveUsage::new(spread.directives.iter()),
            }))
        }
        Selection::InlineFragment(inline) => {
            Ok(SelectionSetItem::InlineFragment(SelectionSetInlineFragment {
                on_type: inline.selection_set.ty.to_string(),
                selection_set: SelectionSet::build(catalog, &inline.selection_set)?,
                directives: DirectiveUsage::new(inline.directives.iter()),
            }))
        }
    }
}

fn build_field(
    catalog: &TypeCatalog,
    parent: &executable::SelectionSet,
    field: &executable::Field,
) -> Result<SelectionSetField, NormalizeError> {
    let ty = catalog.classify(&field.definition.ty)?;
    let has_subselection = !field.selection_set.selections.is_empty();
    let invalid = match (ty.is_leaf(), has_subselection) {
        (true, true) => Some(InvalidSelectionReason::SubselectionOnLeaf),
        (false, false) => Some(InvalidSelectionReason::MissingSubselection),
        _ => None,
    };
    if let Some(reason) = invalid {
        return Err(NormalizeError::InvalidSelection {
            parent_type: parent.ty.to_string(),
            field: field.name.to_string(),
            field_type: ty.raw,
            reason,
        });
    }
    let selection_set = if ty.is_leaf() {
        SelectionSet::default()
    } else {
        SelectionSet::build(catalog, &field.selection_set)?
    };
    Ok(SelectionSetField {
        name: field.name.to_string(),
        alias: field.alias.as_ref().map(|alias| alias.to_string()),
        ty,
        selection_set,
        directives: DirectiveUsage::new(field.directives.iter()),
    })
}
