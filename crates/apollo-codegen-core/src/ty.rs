//! Classification of type references into one semantic kind plus list and
//! nullability flags.

use crate::NormalizeError;
use apollo_compiler::ast::Type;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::Schema;
use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::Serialize;
use serde::Serializer;

/// The semantic kind of a named type.
///
/// Serializes as six mutually exclusive booleans
/// (`isType`, `isScalar`, `isInterface`, `isUnion`, `isInputType`, `isEnum`)
/// so that logic-less templates can branch on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// An object type
    Type,
    Scalar,
    Interface,
    Union,
    /// An input object type
    InputType,
    Enum,
}

impl TypeKind {
    pub fn of(definition: &ExtendedType) -> Self {
        match definition {
            ExtendedType::Object(_) => Self::Type,
            ExtendedType::Scalar(_) => Self::Scalar,
            ExtendedType::Interface(_) => Self::Interface,
            ExtendedType::Union(_) => Self::Union,
            ExtendedType::InputObject(_) => Self::InputType,
            ExtendedType::Enum(_) => Self::Enum,
        }
    }

    /// Returns whether values of this kind are selected without a sub-selection:
    /// scalars and enums.
    pub fn is_leaf(self) -> bool {
        matches!(self, Self::Scalar | Self::Enum)
    }
}

impl Serialize for TypeKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut flags = serializer.serialize_struct("TypeKind", 6)?;
        flags.serialize_field("isType", &(*self == Self::Type))?;
        flags.serialize_field("isScalar", &(*self == Self::Scalar))?;
        flags.serialize_field("isInterface", &(*self == Self::Interface))?;
        flags.serialize_field("isUnion", &(*self == Self::Union))?;
        flags.serialize_field("isInputType", &(*self == Self::InputType))?;
        flags.serialize_field("isEnum", &(*self == Self::Enum))?;
        flags.end()
    }
}

/// A classified type reference, such as the type of a field, argument or variable.
///
/// `is_required` reflects the outer non-null wrapper only.
/// The nullability of list items is tracked separately by `is_nullable_array`,
/// which is only ever `true` together with `is_array`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeReference {
    /// The innermost named type
    #[serde(rename = "type")]
    pub name: String,
    /// The type as written in GraphQL syntax, for example `[String!]!`
    pub raw: String,
    #[serde(flatten)]
    pub kind: TypeKind,
    pub is_required: bool,
    pub is_array: bool,
    pub is_nullable_array: bool,
}

impl TypeReference {
    pub fn is_type(&self) -> bool {
        self.kind == TypeKind::Type
    }

    pub fn is_scalar(&self) -> bool {
        self.kind == TypeKind::Scalar
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_union(&self) -> bool {
        self.kind == TypeKind::Union
    }

    pub fn is_input_type(&self) -> bool {
        self.kind == TypeKind::InputType
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }
}

/// Every type name declared in a schema, partitioned by kind.
///
/// Built once per schema and queried for each type reference.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    kinds: IndexMap<String, TypeKind>,
}

impl TypeCatalog {
    /// Catalogue all types of `schema`, including built-in scalars and introspection types.
    pub fn new(schema: &Schema) -> Self {
        let kinds = schema
            .types
            .iter()
            .map(|(name, definition)| (name.to_string(), TypeKind::of(definition)))
            .collect();
        Self { kinds }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Returns the kind of the type declared with this name
    pub fn kind(&self, name: &str) -> Result<TypeKind, NormalizeError> {
        self.kinds
            .get(name)
            .copied()
            .ok_or_else(|| NormalizeError::AmbiguousType {
                name: name.to_owned(),
            })
    }

    /// Classify a type reference.
    ///
    /// The outer non-null wrapper sets `is_required` and is then discarded.
    /// A list sets `is_array`, and `is_nullable_array` unless its item type is non-null.
    pub fn classify(&self, ty: &Type) -> Result<TypeReference, NormalizeError> {
        let name = ty.inner_named_type();
        let kind = self.kind(name)?;
        let (is_required, is_array, is_nullable_array) = match ty {
            Type::Named(_) => (false, false, false),
            Type::NonNullNamed(_) => (true, false, false),
            Type::List(item) => (false, true, !item.is_non_null()),
            Type::NonNullList(item) => (true, true, !item.is_non_null()),
        };
        Ok(TypeReference {
            name: name.to_string(),
            raw: ty.to_string(),
            kind,
            is_required,
            is_array,
            is_nullable_array,
        })
    }
}
