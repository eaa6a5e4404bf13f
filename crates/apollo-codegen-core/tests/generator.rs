use crate::executable;
use crate::schema;
use apollo_codegen_core::generate;
use apollo_codegen_core::generator::BoxError;
use apollo_codegen_core::generator::FileOutput;
use apollo_codegen_core::generator::GenerateError;
use apollo_codegen_core::generator::Generated;
use apollo_codegen_core::generator::GeneratorConfig;
use apollo_codegen_core::generator::InputMode;
use apollo_codegen_core::generator::OutputProducer;
use apollo_codegen_core::generator::Primitives;
use apollo_codegen_core::generator::ProcessingOutput;
use apollo_codegen_core::generator::Settings;
use apollo_codegen_core::generator::TemplateDocuments;
use apollo_codegen_core::generator::TemplateSource;
use apollo_codegen_core::generator::Templates;
use apollo_codegen_core::Document;
use apollo_codegen_core::SchemaTemplateContext;
use apollo_compiler::ExecutableDocument;
use pretty_assertions::assert_eq;
use serde_json_bytes::Value as JsonValue;

const QUERY: &str = "query GetUser { user { id friends { name } } }";

fn config(flatten_types: bool) -> GeneratorConfig {
    serde_json::from_value(serde_json::json!({
        "inputType": "SINGLE_FILE",
        "flattenTypes": flatten_types,
        "templates": "./templates",
    }))
    .unwrap()
}

#[test]
fn config_from_json() {
    let config: GeneratorConfig = serde_json::from_value(serde_json::json!({
        "inputType": "MULTIPLE_FILES",
        "flattenTypes": true,
        "config": { "prefix": "I", "strict": true },
        "templates": { "index": "index.handlebars", "partials": ["a", "b"] },
        "primitives": {
            "String": "String",
            "Int": "i32",
            "Float": "f64",
            "Boolean": "bool",
            "ID": "String"
        },
        "filesExtension": "rs"
    }))
    .unwrap();

    assert_eq!(config.input_type, InputMode::MultipleFiles);
    assert!(config.flatten_types);
    assert_eq!(config.config["prefix"], JsonValue::from("I"));
    assert_eq!(config.out_file, None);
    assert_eq!(config.files_extension.as_deref(), Some("rs"));
    let Templates::Named(templates) = &config.templates else {
        panic!("expected named templates")
    };
    assert_eq!(
        templates["index"],
        TemplateSource::One("index.handlebars".into())
    );
    assert_eq!(
        templates["partials"],
        TemplateSource::Many(vec!["a".into(), "b".into()])
    );
    assert_eq!(config.primitives.resolve("Int"), "i32");
    assert_eq!(config.primitives.resolve("ID"), "String");
    assert_eq!(config.primitives.resolve("User"), "User");
}

#[test]
fn config_defaults() {
    let config = config(false);
    assert_eq!(config.input_type, InputMode::SingleFile);
    assert_eq!(config.templates, Templates::Location("./templates".into()));
    assert_eq!(config.primitives, Primitives::default());
    assert_eq!(config.primitives.resolve("Float"), "number");
    assert!(config.config.is_empty());

    let settings: Settings = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, Settings::default());
    assert!(settings.generate_schema);
    assert!(settings.generate_documents);
    assert!(!settings.verbose);
}

#[test]
fn templates_get_plain_documents() {
    let schema = schema();
    let query = executable(&schema, QUERY);
    let producer = OutputProducer::Templates(config(false));
    assert!(!producer.is_custom_processing_function());
    assert!(producer.generator_config().is_some());

    let generated = generate(&producer, &schema, [&*query], &Settings::default()).unwrap();
    let Generated::Templates(context) = generated else {
        panic!("expected a template context")
    };
    assert!(context.schema.get_type("User").is_some());
    let TemplateDocuments::Plain(document) = &context.documents else {
        panic!("expected plain documents")
    };
    assert_eq!(document.operations[0].name.as_deref(), Some("GetUser"));
    assert_eq!(context.primitives, Primitives::default());
}

#[test]
fn templates_get_flattened_documents() {
    let schema = schema();
    let query = executable(&schema, QUERY);
    let producer = OutputProducer::Templates(config(true));
    let generated = generate(&producer, &schema, [&*query], &Settings::default()).unwrap();
    let Generated::Templates(context) = generated else {
        panic!("expected a template context")
    };
    let TemplateDocuments::Flattened(document) = &context.documents else {
        panic!("expected flattened documents")
    };
    let models: Vec<_> = document.operations[0]
        .inner_models
        .iter()
        .map(|model| model.model_type.as_str())
        .collect();
    assert_eq!(models, ["User", "Friends"]);
}

fn summary(
    schema: &SchemaTemplateContext,
    documents: &Document,
    settings: &Settings,
) -> Vec<FileOutput> {
    let content = format!(
        "types={} operations={} verbose={}",
        schema.types.len(),
        documents.operations.len(),
        settings.verbose
    );
    vec![FileOutput {
        filename: "summary.txt".into(),
        content,
    }]
}

#[test]
fn custom_processing_function() {
    let schema = schema();
    let query = executable(&schema, QUERY);
    let producer = OutputProducer::custom(
        |schema: &SchemaTemplateContext,
         documents: &Document,
         settings: &Settings|
         -> Result<ProcessingOutput, BoxError> {
            Ok(summary(schema, documents, settings).into())
        },
    );
    assert!(producer.is_custom_processing_function());
    assert!(producer.generator_config().is_none());

    let settings = Settings {
        verbose: true,
        ..Settings::default()
    };
    let Generated::Files(files) = generate(&producer, &schema, [&*query], &settings).unwrap()
    else {
        panic!("expected files")
    };
    assert_eq!(
        files,
        [FileOutput {
            filename: "summary.txt".into(),
            content: "types=5 operations=1 verbose=true".into(),
        }]
    );
}

#[test]
fn deferred_custom_output() {
    let schema = schema();
    let query = executable(&schema, QUERY);
    let producer = OutputProducer::custom(
        |schema: &SchemaTemplateContext,
         documents: &Document,
         settings: &Settings|
         -> Result<ProcessingOutput, BoxError> {
            let files = summary(schema, documents, settings);
            Ok(ProcessingOutput::Deferred(Box::pin(async move { Ok::<_, BoxError>(files) })))
        },
    );
    let Generated::Files(files) =
        generate(&producer, &schema, [&*query], &Settings::default()).unwrap()
    else {
        panic!("expected files")
    };
    assert_eq!(files[0].content, "types=5 operations=1 verbose=false");
}

#[test]
fn custom_processing_failure() {
    let schema = schema();
    let producer = OutputProducer::custom(
        |_: &SchemaTemplateContext,
         _: &Document,
         _: &Settings|
         -> Result<ProcessingOutput, BoxError> {
            Ok(ProcessingOutput::Deferred(Box::pin(async {
                Err::<Vec<FileOutput>, BoxError>("disk full".into())
            })))
        },
    );
    let no_documents: Vec<&ExecutableDocument> = Vec::new();
    let err = generate(&producer, &schema, no_documents, &Settings::default()).unwrap_err();
    assert!(matches!(err, GenerateError::Custom(_)));
    assert_eq!(err.to_string(), "custom processing function failed: disk full");
}

#[test]
fn normalization_errors_stop_generation() {
    let schema = schema();
    let query = crate::unvalidated(&schema, "{ user }");
    let producer = OutputProducer::Templates(config(false));
    let err = generate(&producer, &schema, [&query], &Settings::default()).unwrap_err();
    assert!(matches!(err, GenerateError::Normalize(_)));
}

#[test]
fn documents_can_be_skipped() {
    let schema = schema();
    // would fail to normalize if it were read
    let query = crate::unvalidated(&schema, "{ user }");
    let settings = Settings {
        generate_documents: false,
        ..Settings::default()
    };
    let producer = OutputProducer::Templates(config(false));
    let Generated::Templates(context) =
        generate(&producer, &schema, [&query], &settings).unwrap()
    else {
        panic!("expected a template context")
    };
    assert_eq!(context.documents, TemplateDocuments::Plain(Document::default()));
    assert!(context.schema.has_types);
    assert!(!context.settings.generate_documents);
}
