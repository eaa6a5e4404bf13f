//! Indexing of directive applications and user-defined directive definitions

use crate::field::Argument;
use crate::ty::TypeCatalog;
use crate::NormalizeError;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::Value;
use apollo_compiler::schema::DirectiveDefinition;
use apollo_compiler::schema::DirectiveLocation;
use apollo_compiler::Node;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json_bytes::Value as JsonValue;

/// Directives defined by the GraphQL specification, excluded from
/// [`SchemaTemplateContext::defined_directives`][crate::SchemaTemplateContext::defined_directives]
pub const BUILT_IN_DIRECTIVES: [&str; 5] = ["skip", "include", "deprecated", "specifiedBy", "oneOf"];

/// Argument values of one directive application, keyed by argument name
pub type DirectiveArguments = IndexMap<String, JsonValue>;

/// Directive applications of one node, keyed by directive name
pub type DirectiveUseMap = IndexMap<String, DirectiveArguments>;

/// The directives applied to a schema or document node.
///
/// Serializes as `directives` (the use map) and `usesDirectives`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveUsage {
    #[serde(rename = "directives")]
    applied: DirectiveUseMap,
    uses_directives: bool,
}

impl DirectiveUsage {
    /// Index directive applications in application order.
    ///
    /// A repeated directive keeps the position of its first application
    /// and the arguments of its last one.
    pub fn new<'a>(directives: impl IntoIterator<Item = &'a Node<Directive>>) -> Self {
        let mut applied = DirectiveUseMap::new();
        for directive in directives {
            let arguments = directive
                .arguments
                .iter()
                .map(|argument| (argument.name.to_string(), value_to_json(&argument.value)))
                .collect();
            applied.insert(directive.name.to_string(), arguments);
        }
        let uses_directives = !applied.is_empty();
        Self {
            applied,
            uses_directives,
        }
    }

    pub fn uses_directives(&self) -> bool {
        self.uses_directives
    }

    pub fn get(&self, name: &str) -> Option<&DirectiveArguments> {
        self.applied.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.applied.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DirectiveArguments)> {
        self.applied.iter().map(|(name, args)| (name.as_str(), args))
    }
}

/// Convert a GraphQL value to JSON for templates.
///
/// Enum values become strings, variables become `"$name"` strings,
/// and numbers JSON cannot represent exactly keep their literal text.
pub(crate) fn value_to_json(value: &Node<Value>) -> JsonValue {
    match &**value {
        Value::Null => JsonValue::Null,
        Value::Enum(value) => value.as_str().into(),
        Value::Variable(name) => format!("${name}").into(),
        Value::String(value) => value.as_str().into(),
        Value::Boolean(value) => (*value).into(),
        Value::Int(value) => int_or_literal(value.as_str()),
        Value::Float(value) => float_or_literal(value.as_str()),
        Value::List(items) => items.iter().map(value_to_json).collect(),
        Value::Object(fields) => fields
            .iter()
            .map(|(name, value)| (name.as_str(), value_to_json(value)))
            .collect(),
    }
}

fn int_or_literal(literal: &str) -> JsonValue {
    if let Ok(int) = literal.parse::<i64>() {
        JsonValue::Number(int.into())
    } else if let Ok(int) = literal.parse::<u64>() {
        JsonValue::Number(int.into())
    } else {
        literal.into()
    }
}

fn float_or_literal(literal: &str) -> JsonValue {
    match literal.parse::<f64>() {
        Ok(float) if float.is_finite() => match literal.parse() {
            Ok(number) => JsonValue::Number(number),
            Err(_) => literal.into(),
        },
        _ => literal.into(),
    }
}

/// One boolean per location a directive definition may be applied to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveLocations {
    pub on_query: bool,
    pub on_mutation: bool,
    pub on_subscription: bool,
    pub on_field: bool,
    /// `FRAGMENT_DEFINITION`
    pub on_fragment: bool,
    pub on_fragment_spread: bool,
    pub on_inline_fragment: bool,
    pub on_variable_definition: bool,

    pub on_schema: bool,
    pub on_scalar: bool,
    pub on_object: bool,
    pub on_field_definition: bool,
    /// `ARGUMENT_DEFINITION`
    pub on_argument: bool,
    pub on_interface: bool,
    pub on_union: bool,
    pub on_enum: bool,
    pub on_enum_value: bool,
    pub on_input_object: bool,
    /// `INPUT_FIELD_DEFINITION`
    pub on_input_field: bool,
}

impl DirectiveLocations {
    pub fn new(locations: &[DirectiveLocation]) -> Self {
        let on = |location| locations.contains(&location);
        Self {
            on_query: on(DirectiveLocation::Query),
            on_mutation: on(DirectiveLocation::Mutation),
            on_subscription: on(DirectiveLocation::Subscription),
            on_field: on(DirectiveLocation::Field),
            on_fragment: on(DirectiveLocation::FragmentDefinition),
            on_fragment_spread: on(DirectiveLocation::FragmentSpread),
            on_inline_fragment: on(DirectiveLocation::InlineFragment),
            on_variable_definition: on(DirectiveLocation::VariableDefinition),
            on_schema: on(DirectiveLocation::Schema),
            on_scalar: on(DirectiveLocation::Scalar),
            on_object: on(DirectiveLocation::Object),
            on_field_definition: on(DirectiveLocation::FieldDefinition),
            on_argument: on(DirectiveLocation::ArgumentDefinition),
            on_interface: on(DirectiveLocation::Interface),
            on_union: on(DirectiveLocation::Union),
            on_enum: on(DirectiveLocation::Enum),
            on_enum_value: on(DirectiveLocation::EnumValue),
            on_input_object: on(DirectiveLocation::InputObject),
            on_input_field: on(DirectiveLocation::InputFieldDefinition),
        }
    }
}

/// A directive definition declared by the schema itself
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinedDirective {
    pub name: String,
    pub description: Option<String>,
    /// Locations as written in GraphQL syntax, for example `FIELD_DEFINITION`
    pub locations: Vec<String>,
    pub arguments: Vec<Argument>,
    pub has_arguments: bool,
    pub repeatable: bool,
    #[serde(flatten)]
    pub on: DirectiveLocations,
}

impl DefinedDirective {
    pub fn new(
        catalog: &TypeCatalog,
        definition: &DirectiveDefinition,
    ) -> Result<Self, NormalizeError> {
        let arguments = definition
            .arguments
            .iter()
            .map(|argument| Argument::new(catalog, argument))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: definition.name.to_string(),
            description: definition.description.as_deref().map(str::to_owned),
            locations: definition
                .locations
                .iter()
                .map(|location| location.name().to_owned())
                .collect(),
            has_arguments: !arguments.is_empty(),
            arguments,
            repeatable: definition.repeatable,
            on: DirectiveLocations::new(&definition.locations),
        })
    }

    pub fn is_built_in(name: &str) -> bool {
        BUILT_IN_DIRECTIVES.contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apollo_compiler::ast;

    fn operation_directives(source: &str) -> DirectiveUsage {
        let document = ast::Document::parse(source, "query.graphql").unwrap();
        let ast::Definition::OperationDefinition(operation) = &document.definitions[0] else {
            panic!("expected an operation")
        };
        DirectiveUsage::new(operation.directives.iter())
    }

    #[test]
    fn no_directives() {
        let usage = operation_directives("query Q { x }");
        assert!(!usage.uses_directives());
        assert!(usage.is_empty());
    }

    #[test]
    fn application_order_is_kept() {
        let usage = operation_directives("query Q @b @a(if: true) { x }");
        assert!(usage.uses_directives());
        let names: Vec<_> = usage.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(usage.get("a").unwrap()["if"], JsonValue::Bool(true));
    }

    #[test]
    fn last_repetition_wins() {
        let usage = operation_directives("query Q @tag(name: FIRST) @other @tag(name: LAST) { x }");
        assert_eq!(usage.len(), 2);
        let names: Vec<_> = usage.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["tag", "other"]);
        assert_eq!(usage.get("tag").unwrap()["name"], JsonValue::from("LAST"));
    }

    #[test]
    fn values_convert_to_json() {
        let usage = operation_directives(
            r#"query Q($id: ID) @d(int: 42, float: 1.5, var: $id, list: [null, "x"], obj: { k: V }) { x }"#,
        );
        let arguments = usage.get("d").unwrap();
        assert_eq!(
            serde_json::to_value(arguments).unwrap(),
            serde_json::json!({
                "int": 42,
                "float": 1.5,
                "var": "$id",
                "list": [null, "x"],
                "obj": { "k": "V" },
            })
        );
    }

    #[test]
    fn oversized_numbers_keep_their_literal() {
        assert_eq!(float_or_literal("1e400"), JsonValue::from("1e400"));
        assert_eq!(int_or_literal("7"), JsonValue::Number(7.into()));
        assert_eq!(
            int_or_literal("18446744073709551615"),
            JsonValue::Number(u64::MAX.into())
        );

        let usage =
            operation_directives("query Q @cached(ttl: 12345678901234567890123, f: 1e400) { x }");
        let arguments = usage.get("cached").unwrap();
        assert_eq!(arguments["ttl"], JsonValue::from("12345678901234567890123"));
        assert_eq!(arguments["f"], JsonValue::from("1e400"));
    }

    #[test]
    fn location_flags() {
        let on = DirectiveLocations::new(&[
            DirectiveLocation::FieldDefinition,
            DirectiveLocation::FragmentDefinition,
        ]);
        assert!(on.on_field_definition);
        assert!(on.on_fragment);
        assert!(!on.on_field);
        assert!(!on.on_query);
    }
}
