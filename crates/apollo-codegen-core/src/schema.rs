//! Normalized schema: one record sequence per kind of type definition

use crate::directives::DefinedDirective;
use crate::directives::DirectiveUsage;
use crate::field::Field;
use crate::ty::TypeCatalog;
use crate::NormalizeError;
use apollo_compiler::schema;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

fn component_directives(directives: &schema::DirectiveList) -> DirectiveUsage {
    DirectiveUsage::new(directives.iter().map(|component| &component.node))
}

fn description(description: &Option<apollo_compiler::Node<str>>) -> Option<String> {
    description.as_deref().map(str::to_owned)
}

/// An object type or an input object type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
    pub has_fields: bool,
    pub is_input_type: bool,
    /// Names of implemented interfaces. Always empty for input object types.
    pub interfaces: Vec<String>,
    pub has_interfaces: bool,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

impl Type {
    fn from_object(
        catalog: &TypeCatalog,
        object: &schema::ObjectType,
    ) -> Result<Self, NormalizeError> {
        let fields = object
            .fields
            .values()
            .map(|field| Field::new(catalog, field))
            .collect::<Result<Vec<_>, _>>()?;
        let interfaces: Vec<String> = object
            .implements_interfaces
            .iter()
            .map(|interface| interface.name.to_string())
            .collect();
        Ok(Self {
            name: object.name.to_string(),
            description: description(&object.description),
            has_fields: !fields.is_empty(),
            fields,
            is_input_type: false,
            has_interfaces: !interfaces.is_empty(),
            interfaces,
            directives: component_directives(&object.directives),
        })
    }

    fn from_input_object(
        catalog: &TypeCatalog,
        input: &schema::InputObjectType,
    ) -> Result<Self, NormalizeError> {
        let fields = input
            .fields
            .values()
            .map(|field| Field::new_input(catalog, field))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: input.name.to_string(),
            description: description(&input.description),
            has_fields: !fields.is_empty(),
            fields,
            is_input_type: true,
            interfaces: Vec::new(),
            has_interfaces: false,
            directives: component_directives(&input.directives),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interface {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
    pub has_fields: bool,
    /// Interfaces this interface itself implements
    pub interfaces: Vec<String>,
    pub has_interfaces: bool,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

impl Interface {
    fn new(catalog: &TypeCatalog, interface: &schema::InterfaceType) -> Result<Self, NormalizeError> {
        let fields = interface
            .fields
            .values()
            .map(|field| Field::new(catalog, field))
            .collect::<Result<Vec<_>, _>>()?;
        let interfaces: Vec<String> = interface
            .implements_interfaces
            .iter()
            .map(|interface| interface.name.to_string())
            .collect();
        Ok(Self {
            name: interface.name.to_string(),
            description: description(&interface.description),
            has_fields: !fields.is_empty(),
            fields,
            has_interfaces: !interfaces.is_empty(),
            interfaces,
            directives: component_directives(&interface.directives),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Union {
    pub name: String,
    pub description: Option<String>,
    /// Member object type names
    pub possible_types: Vec<String>,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

impl Union {
    fn new(union_: &schema::UnionType) -> Self {
        Self {
            name: union_.name.to_string(),
            description: description(&union_.description),
            possible_types: union_
                .members
                .iter()
                .map(|member| member.name.to_string())
                .collect(),
            directives: component_directives(&union_.directives),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enum {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

impl Enum {
    fn new(enum_: &schema::EnumType) -> Self {
        Self {
            name: enum_.name.to_string(),
            description: description(&enum_.description),
            values: enum_
                .values
                .values()
                .map(|value| EnumValue {
                    name: value.value.to_string(),
                    value: value.value.to_string(),
                    description: description(&value.description),
                    directives: DirectiveUsage::new(value.directives.iter()),
                })
                .collect(),
            directives: component_directives(&enum_.directives),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub name: String,
    /// The value as it appears in responses. Same as `name` for GraphQL enums.
    pub value: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

/// A custom scalar type. Built-in scalars are not included.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scalar {
    pub name: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub directives: DirectiveUsage,
}

/// The normalized schema handed to templates.
///
/// Built-in scalars, introspection types and built-in directives are left out.
/// Sequences keep the declaration order of the schema.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaTemplateContext {
    pub types: Vec<Type>,
    pub input_types: Vec<Type>,
    pub enums: Vec<Enum>,
    pub unions: Vec<Union>,
    pub interfaces: Vec<Interface>,
    pub scalars: Vec<Scalar>,
    pub defined_directives: Vec<DefinedDirective>,

    pub has_types: bool,
    pub has_input_types: bool,
    pub has_enums: bool,
    pub has_unions: bool,
    pub has_interfaces: bool,
    pub has_scalars: bool,
    pub has_defined_directives: bool,

    /// Directives applied to the `schema` definition
    #[serde(flatten)]
    pub directives: DirectiveUsage,

    /// The schema this context was built from, for consumers that need more than the IR.
    ///
    /// Not serialized and not compared by `PartialEq`.
    #[serde(skip)]
    pub raw_schema: Arc<Valid<Schema>>,
}

impl SchemaTemplateContext {
    /// Normalize every type and directive definition of `schema`.
    ///
    /// Types reference each other by name only, so self-referencing and
    /// mutually recursive types normalize in one pass.
    pub fn new(schema: &Valid<Schema>) -> Result<Self, NormalizeError> {
        let catalog = TypeCatalog::new(schema);

        let mut types = Vec::new();
        let mut input_types = Vec::new();
        let mut enums = Vec::new();
        let mut unions = Vec::new();
        let mut interfaces = Vec::new();
        let mut scalars = Vec::new();
        for definition in schema.types.values() {
            if definition.is_built_in() {
                continue;
            }
            match definition {
                ExtendedType::Object(object) => types.push(Type::from_object(&catalog, object)?),
                ExtendedType::InputObject(input) => {
                    input_types.push(Type::from_input_object(&catalog, input)?)
                }
                ExtendedType::Interface(interface) => {
                    interfaces.push(Interface::new(&catalog, interface)?)
                }
                ExtendedType::Union(union_) => unions.push(Union::new(union_)),
                ExtendedType::Enum(enum_) => enums.push(Enum::new(enum_)),
                ExtendedType::Scalar(scalar) => scalars.push(Scalar {
                    name: scalar.name.to_string(),
                    description: description(&scalar.description),
                    directives: component_directives(&scalar.directives),
                }),
            }
        }

        let defined_directives = schema
            .directive_definitions
            .values()
            .filter(|definition| !DefinedDirective::is_built_in(&definition.name))
            .map(|definition| DefinedDirective::new(&catalog, definition))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            types = types.len(),
            input_types = input_types.len(),
            enums = enums.len(),
            unions = unions.len(),
            interfaces = interfaces.len(),
            scalars = scalars.len(),
            defined_directives = defined_directives.len(),
            "normalized schema"
        );

        Ok(Self {
            has_types: !types.is_empty(),
            has_input_types: !input_types.is_empty(),
            has_enums: !enums.is_empty(),
            has_unions: !unions.is_empty(),
            has_interfaces: !interfaces.is_empty(),
            has_scalars: !scalars.is_empty(),
            has_defined_directives: !defined_directives.is_empty(),
            types,
            input_types,
            enums,
            unions,
            interfaces,
            scalars,
            defined_directives,
            directives: component_directives(&schema.schema_definition.directives),
            raw_schema: Arc::new(schema.clone()),
        })
    }

    /// Returns the object type with the given name
    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|ty| ty.name == name)
    }

    /// Returns the input object type with the given name
    pub fn get_input_type(&self, name: &str) -> Option<&Type> {
        self.input_types.iter().find(|ty| ty.name == name)
    }

    pub fn get_interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|interface| interface.name == name)
    }

    pub fn get_union(&self, name: &str) -> Option<&Union> {
        self.unions.iter().find(|union_| union_.name == name)
    }

    pub fn get_enum(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|enum_| enum_.name == name)
    }

    pub fn get_scalar(&self, name: &str) -> Option<&Scalar> {
        self.scalars.iter().find(|scalar| scalar.name == name)
    }
}

impl PartialEq for SchemaTemplateContext {
    fn eq(&self, other: &Self) -> bool {
        let Self {
            types,
            input_types,
            enums,
            unions,
            interfaces,
            scalars,
            defined_directives,
            has_types,
            has_input_types,
            has_enums,
            has_unions,
            has_interfaces,
            has_scalars,
            has_defined_directives,
            directives,
            raw_schema: _,
        } = self;
        *types == other.types
            && *input_types == other.input_types
            && *enums == other.enums
            && *unions == other.unions
            && *interfaces == other.interfaces
            && *scalars == other.scalars
            && *defined_directives == other.defined_directives
            && *has_types == other.has_types
            && *has_input_types == other.has_input_types
            && *has_enums == other.has_enums
            && *has_unions == other.has_unions
            && *has_interfaces == other.has_interfaces
            && *has_scalars == other.has_scalars
            && *has_defined_directives == other.has_defined_directives
            && *directives == other.directives
    }
}

impl fmt::Debug for SchemaTemplateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaTemplateContext")
            .field("types", &self.types)
            .field("input_types", &self.input_types)
            .field("enums", &self.enums)
            .field("unions", &self.unions)
            .field("interfaces", &self.interfaces)
            .field("scalars", &self.scalars)
            .field("defined_directives", &self.defined_directives)
            .field("directives", &self.directives)
            .finish_non_exhaustive()
    }
}
