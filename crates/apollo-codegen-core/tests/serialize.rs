use crate::executable;
use crate::schema;
use apollo_codegen_core::normalize_documents;
use apollo_codegen_core::normalize_schema;
use expect_test::expect;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn schema_field() {
    let context = normalize_schema(&schema()).unwrap();
    let tags = &context.get_type("User").unwrap().fields[2];
    assert_eq!(
        serde_json::to_value(tags).unwrap(),
        json!({
            "name": "tags",
            "description": null,
            "arguments": [],
            "hasArguments": false,
            "type": "String",
            "raw": "[String!]",
            "isType": false,
            "isScalar": true,
            "isInterface": false,
            "isUnion": false,
            "isInputType": false,
            "isEnum": false,
            "isRequired": false,
            "isArray": true,
            "isNullableArray": false,
            "directives": {},
            "usesDirectives": false,
        })
    );
}

#[test]
fn schema_context() {
    let context = normalize_schema(&schema()).unwrap();
    let value = serde_json::to_value(&context).unwrap();
    assert_eq!(value["hasTypes"], json!(true));
    assert_eq!(value["hasScalars"], json!(true));
    assert_eq!(value["scalars"][0]["name"], json!("Date"));
    assert_eq!(value["unions"][0]["possibleTypes"], json!(["User", "Post"]));
    assert_eq!(value["usesDirectives"], json!(false));
    assert!(value.get("rawSchema").is_none());

    let auth = &value["definedDirectives"][0];
    assert_eq!(auth["onObject"], json!(true));
    assert_eq!(auth["onFieldDefinition"], json!(true));
    assert_eq!(auth["onQuery"], json!(false));
    assert_eq!(auth["locations"], json!(["OBJECT", "FIELD_DEFINITION"]));

    let friends = &value["types"][0]["fields"][3];
    assert_eq!(friends["directives"], json!({ "auth": { "requires": "USER" } }));
    assert_eq!(friends["usesDirectives"], json!(true));
    assert_eq!(friends["arguments"][0]["defaultValue"], json!(10));
}

#[test]
fn selection_nodes() {
    let schema = schema();
    let query = executable(&schema, "{ user { id ...F } } fragment F on User { name }");
    let document = normalize_documents(&schema, [&*query]).unwrap();
    let value = serde_json::to_value(&document.operations[0]).unwrap();

    assert_eq!(value["name"], json!(null));
    assert_eq!(value["operationType"], json!("query"));
    assert_eq!(value["isQuery"], json!(true));
    assert_eq!(value["isMutation"], json!(false));
    assert_eq!(value["hasFields"], json!(true));
    assert_eq!(value["hasFragmentsSpread"], json!(false));

    let user = &value["selectionSet"][0];
    assert_eq!(user["isField"], json!(true));
    assert_eq!(user["isLeaf"], json!(false));
    assert_eq!(user["fields"].as_array().unwrap().len(), 1);
    assert_eq!(user["fragmentsSpread"].as_array().unwrap().len(), 1);

    assert_eq!(
        user["selectionSet"][0],
        json!({
            "isField": true,
            "isFragmentSpread": false,
            "isInlineFragment": false,
            "isLeaf": true,
            "name": "id",
            "alias": null,
            "type": "ID",
            "raw": "ID!",
            "isType": false,
            "isScalar": true,
            "isInterface": false,
            "isUnion": false,
            "isInputType": false,
            "isEnum": false,
            "isRequired": true,
            "isArray": false,
            "isNullableArray": false,
            "selectionSet": [],
            "fields": [],
            "fragmentsSpread": [],
            "inlineFragments": [],
            "hasFields": false,
            "hasFragmentsSpread": false,
            "hasInlineFragments": false,
            "directives": {},
            "usesDirectives": false,
        })
    );
    assert_eq!(
        user["selectionSet"][1],
        json!({
            "isField": false,
            "isFragmentSpread": true,
            "isInlineFragment": false,
            "isLeaf": false,
            "fragmentName": "F",
            "directives": {},
            "usesDirectives": false,
        })
    );
    assert_eq!(user["fragmentsSpread"][0], user["selectionSet"][1]);
}

#[test]
fn document_flags() {
    let schema = schema();
    let query = executable(&schema, "fragment F on User { name } query { user { ...F } }");
    let document = normalize_documents(&schema, [&*query]).unwrap();
    let value = serde_json::to_value(&document).unwrap();
    assert_eq!(value["hasFragments"], json!(true));
    assert_eq!(value["hasOperations"], json!(true));
    assert_eq!(value["fragments"][0]["onType"], json!("User"));
    assert_eq!(value["fragments"][0]["fields"][0]["name"], json!("name"));
}

#[test]
fn inline_fragment_node() {
    let schema = schema();
    let query = executable(&schema, "{ search { ... on Post { title } } }");
    let document = normalize_documents(&schema, [&*query]).unwrap();
    let search = document.operations[0].selection_set.items()[0]
        .as_field()
        .unwrap();
    let inline = &search.selection_set.items()[0];
    expect![[r#"
        {
          "isField": false,
          "isFragmentSpread": false,
          "isInlineFragment": true,
          "isLeaf": false,
          "onType": "Post",
          "selectionSet": [
            {
              "isField": true,
              "isFragmentSpread": false,
              "isInlineFragment": false,
              "isLeaf": true,
              "name": "title",
              "alias": null,
              "type": "String",
              "raw": "String",
              "isType": false,
              "isScalar": true,
              "isInterface": false,
              "isUnion": false,
              "isInputType": false,
              "isEnum": false,
              "isRequired": false,
              "isArray": false,
              "isNullableArray": false,
              "selectionSet": [],
              "fields": [],
              "fragmentsSpread": [],
              "inlineFragments": [],
              "hasFields": false,
              "hasFragmentsSpread": false,
              "hasInlineFragments": false,
              "directives": {},
              "usesDirectives": false
            }
          ],
          "fields": [
            {
              "isField": true,
              "isFragmentSpread": false,
              "isInlineFragment": false,
              "isLeaf": true,
              "name": "title",
              "alias": null,
              "type": "String",
              "raw": "String",
              "isType": false,
              "isScalar": true,
              "isInterface": false,
              "isUnion": false,
              "isInputType": false,
              "isEnum": false,
              "isRequired": false,
              "isArray": false,
              "isNullableArray": false,
              "selectionSet": [],
              "fields": [],
              "fragmentsSpread": [],
              "inlineFragments": [],
              "hasFields": false,
              "hasFragmentsSpread": false,
              "hasInlineFragments": false,
              "directives": {},
              "usesDirectives": false
            }
          ],
          "fragmentsSpread": [],
          "inlineFragments": [],
          "hasFields": true,
          "hasFragmentsSpread": false,
          "hasInlineFragments": false,
          "directives": {},
          "usesDirectives": false
        }"#]]
    .assert_eq(&serde_json::to_string_pretty(inline).unwrap());
}
