//! Configuration consumed by a generation run, and the capability to replace
//! templates with a custom processing function.

use crate::document::Document;
use crate::flatten::flatten_document;
use crate::flatten::FlattenDocument;
use crate::schema::SchemaTemplateContext;
use crate::NormalizeError;
use apollo_compiler::validation::Valid;
use apollo_compiler::ExecutableDocument;
use apollo_compiler::Schema;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::Value as JsonValue;

/// Error type returned by custom processing functions
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// How input documents are grouped into output files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputMode {
    /// Everything is rendered into one file
    #[default]
    SingleFile,
    /// One output file per type, operation and fragment
    MultipleFiles,
    /// Templates decide the layout of a whole project
    Project,
}

/// Target-language names of the five built-in scalars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primitives {
    #[serde(rename = "String")]
    pub string: String,
    #[serde(rename = "Int")]
    pub int: String,
    #[serde(rename = "Float")]
    pub float: String,
    #[serde(rename = "Boolean")]
    pub boolean: String,
    #[serde(rename = "ID")]
    pub id: String,
}

impl Default for Primitives {
    fn default() -> Self {
        Self {
            string: "string".into(),
            int: "number".into(),
            float: "number".into(),
            boolean: "boolean".into(),
            id: "string".into(),
        }
    }
}

impl Primitives {
    /// Map a built-in scalar name to its target-language name.
    /// Other type names are returned unchanged.
    pub fn resolve<'a>(&'a self, type_name: &'a str) -> &'a str {
        match type_name {
            "String" => &self.string,
            "Int" => &self.int,
            "Float" => &self.float,
            "Boolean" => &self.boolean,
            "ID" => &self.id,
            _ => type_name,
        }
    }
}

/// A template source: one template, or a list of partials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateSource {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Templates {
    /// Location of a template directory or package
    Location(String),
    /// Templates by name
    Named(IndexMap<String, TemplateSource>),
}

/// Configuration of a template-driven generator.
///
/// The normalizer only reads `flatten_types` and `primitives`;
/// the other settings belong to the template engine and file writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub input_type: InputMode,
    #[serde(default)]
    pub flatten_types: bool,
    /// Free-form settings passed through to templates
    #[serde(default)]
    pub config: IndexMap<String, JsonValue>,
    pub templates: Templates,
    #[serde(default)]
    pub primitives: Primitives,
    #[serde(default)]
    pub out_file: Option<String>,
    #[serde(default)]
    pub files_extension: Option<String>,
}

/// What to generate in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Whether schema output is rendered.
    /// The schema is always normalized, since templates and custom
    /// processing functions resolve document types through it.
    #[serde(default = "enabled")]
    pub generate_schema: bool,
    /// When `false`, documents are not normalized and an empty [`Document`] is handed on
    #[serde(default = "enabled")]
    pub generate_documents: bool,
    #[serde(default)]
    pub verbose: bool,
}

fn enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generate_schema: true,
            generate_documents: true,
            verbose: false,
        }
    }
}

/// A generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutput {
    pub filename: String,
    pub content: String,
}

/// Output of a custom processing function, available now or later
pub enum ProcessingOutput {
    Ready(Vec<FileOutput>),
    Deferred(BoxFuture<'static, Result<Vec<FileOutput>, BoxError>>),
}

impl ProcessingOutput {
    /// Wait for deferred output
    pub fn wait(self) -> Result<Vec<FileOutput>, BoxError> {
        match self {
            Self::Ready(files) => Ok(files),
            Self::Deferred(future) => futures::executor::block_on(future),
        }
    }
}

impl From<Vec<FileOutput>> for ProcessingOutput {
    fn from(files: Vec<FileOutput>) -> Self {
        Self::Ready(files)
    }
}

/// Produces output files directly from the normalized schema and documents,
/// instead of rendering templates.
///
/// Implemented for closures with the same signature as [`process`][Self::process].
pub trait CustomProcessingFunction: Send + Sync {
    fn process(
        &self,
        schema: &SchemaTemplateContext,
        documents: &Document,
        settings: &Settings,
    ) -> Result<ProcessingOutput, BoxError>;
}

impl<F> CustomProcessingFunction for F
where
    F: Fn(&SchemaTemplateContext, &Document, &Settings) -> Result<ProcessingOutput, BoxError>
        + Send
        + Sync,
{
    fn process(
        &self,
        schema: &SchemaTemplateContext,
        documents: &Document,
        settings: &Settings,
    ) -> Result<ProcessingOutput, BoxError> {
        self(schema, documents, settings)
    }
}

/// Either template configuration or a custom processing function
pub enum OutputProducer {
    Templates(GeneratorConfig),
    Custom(Box<dyn CustomProcessingFunction>),
}

impl OutputProducer {
    pub fn custom(function: impl CustomProcessingFunction + 'static) -> Self {
        Self::Custom(Box::new(function))
    }

    pub fn is_custom_processing_function(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    pub fn generator_config(&self) -> Option<&GeneratorConfig> {
        match self {
            Self::Templates(config) => Some(config),
            Self::Custom(_) => None,
        }
    }
}

/// Documents as handed to templates, flattened if configured
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TemplateDocuments {
    Plain(Document),
    Flattened(FlattenDocument),
}

/// Everything a template engine needs for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateContext {
    pub schema: SchemaTemplateContext,
    pub documents: TemplateDocuments,
    pub primitives: Primitives,
    pub config: IndexMap<String, JsonValue>,
    pub settings: Settings,
}

/// Result of [`generate`]
#[derive(Debug)]
pub enum Generated {
    /// Files produced by a custom processing function
    Files(Vec<FileOutput>),
    /// Normalized input ready to render with the configured templates
    Templates(Box<TemplateContext>),
}

#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("custom processing function failed: {0}")]
    Custom(#[source] BoxError),
}

/// Normalize `schema` and `documents` once, then hand them to `producer`.
pub fn generate<'doc>(
    producer: &OutputProducer,
    schema: &Valid<Schema>,
    documents: impl IntoIterator<Item = &'doc ExecutableDocument>,
    settings: &Settings,
) -> Result<Generated, GenerateError> {
    let schema_context = SchemaTemplateContext::new(schema)?;
    let document = if settings.generate_documents {
        Document::new(schema, documents)?
    } else {
        tracing::debug!("document generation disabled, skipping documents");
        Document::default()
    };
    match producer {
        OutputProducer::Custom(function) => {
            let files = function
                .process(&schema_context, &document, settings)
                .and_then(ProcessingOutput::wait)
                .map_err(GenerateError::Custom)?;
            tracing::debug!(files = files.len(), "custom processing function done");
            Ok(Generated::Files(files))
        }
        OutputProducer::Templates(config) => {
            let documents = if config.flatten_types {
                TemplateDocuments::Flattened(flatten_document(&document))
            } else {
                TemplateDocuments::Plain(document)
            };
            Ok(Generated::Templates(Box::new(TemplateContext {
                schema: schema_context,
                documents,
                primitives: config.primitives.clone(),
                config: config.config.clone(),
                settings: settings.clone(),
            })))
        }
    }
}
