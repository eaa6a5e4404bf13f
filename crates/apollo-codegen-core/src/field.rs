//! Normalized field and argument definitions

use crate::directives::value_to_json;
use crate::directives::DirectiveUsage;
use crate::ty::TypeCatalog;
use crate::ty::TypeReference;
use crate::NormalizeError;
use apollo_compiler::schema::FieldDefinition;
use apollo_compiler::schema::InputValueDefinition;
use serde::Serialize;
use serde_json_bytes::Value as JsonValue;

/// An argument of a field or directive definition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    pub name: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub ty: TypeReference,
    pub default_value: Option<JsonValue>,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

impl Argument {
    pub fn new(
        catalog: &TypeCatalog,
        definition: &InputValueDefinition,
    ) -> Result<Self, NormalizeError> {
        Ok(Self {
            name: definition.name.to_string(),
            description: definition.description.as_deref().map(str::to_owned),
            ty: catalog.classify(&definition.ty)?,
            default_value: definition.default_value.as_ref().map(value_to_json),
            directives: DirectiveUsage::new(definition.directives.iter()),
        })
    }
}

/// A field of an object, interface or input object type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    /// Arguments in declaration order. Always empty for input object fields.
    pub arguments: Vec<Argument>,
    pub has_arguments: bool,
    #[serde(flatten)]
    pub ty: TypeReference,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

impl Field {
    /// Normalize a field of an object or interface type
    pub fn new(catalog: &TypeCatalog, definition: &FieldDefinition) -> Result<Self, NormalizeError> {
        let arguments = definition
            .arguments
            .iter()
            .map(|argument| Argument::new(catalog, argument))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: definition.name.to_string(),
            description: definition.description.as_deref().map(str::to_owned),
            has_arguments: !arguments.is_empty(),
            arguments,
            ty: catalog.classify(&definition.ty)?,
            directives: DirectiveUsage::new(definition.directives.iter()),
        })
    }

    /// Normalize a field of an input object type
    pub fn new_input(
        catalog: &TypeCatalog,
        definition: &InputValueDefinition,
    ) -> Result<Self, NormalizeError> {
        Ok(Self {
            name: definition.name.to_string(),
            description: definition.description.as_deref().map(str::to_owned),
            arguments: Vec::new(),
            has_arguments: false,
            ty: catalog.classify(&definition.ty)?,
            directives: DirectiveUsage::new(definition.directives.iter()),
        })
    }
}
