//! The subset of the OpenAPI 3 document model that nfbench reads.
//!
//! All structures are lenient: unknown keys are ignored and missing keys fall back to defaults, so
//! that documents from different 3GPP releases load without special casing.

use std::collections::BTreeMap;

use nfbench_types::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parsed OpenAPI document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OpenApiDocument {
    /// The OpenAPI version. Documents without it are not OpenAPI documents.
    pub openapi: Option<String>,
    /// Document metadata.
    pub info: Info,
    /// Server URLs, the first of which determines the service base path.
    pub servers: Vec<Server>,
    /// Security requirements, used to derive the service name from OAuth2 scopes.
    pub security: Vec<BTreeMap<String, Vec<String>>>,
    /// Operations by path template.
    pub paths: BTreeMap<String, PathItem>,
    /// Document tags.
    pub tags: Vec<Tag>,
    /// Reusable definitions.
    pub components: Components,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Info {
    pub title: String,
    pub description: String,
    pub version: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Server {
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Components {
    pub schemas: BTreeMap<String, Schema>,
    pub parameters: BTreeMap<String, Parameter>,
}

/// All operations on a single path.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathItem {
    /// Parameters shared by all operations of this path.
    pub parameters: Vec<Parameter>,
    pub get: Option<Operation>,
    pub post: Option<Operation>,
    pub put: Option<Operation>,
    pub delete: Option<Operation>,
    pub patch: Option<Operation>,
    pub head: Option<Operation>,
    pub options: Option<Operation>,
}

impl PathItem {
    /// Iterates the defined operations with their methods.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        [
            (Method::Get, &self.get),
            (Method::Post, &self.post),
            (Method::Put, &self.put),
            (Method::Delete, &self.delete),
            (Method::Patch, &self.patch),
            (Method::Head, &self.head),
            (Method::Options, &self.options),
        ]
        .into_iter()
        .filter_map(|(method, operation)| Some((method, operation.as_ref()?)))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
}

impl Operation {
    /// The description, or the summary if there is no description.
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or(self.summary.as_deref())
            .filter(|d| !d.trim().is_empty())
    }
}

/// A parameter, or a reference to one.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Parameter {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<Schema>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestBody {
    pub description: Option<String>,
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

impl RequestBody {
    /// Returns the schema of the first JSON content type.
    pub fn json_schema(&self) -> Option<&Schema> {
        self.content
            .iter()
            .find(|(content_type, _)| content_type.contains("json"))
            .and_then(|(_, media)| media.schema.as_ref())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

/// The `type` of a schema, which OpenAPI 3.1 allows to be a list.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

/// A JSON schema definition.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Schema {
    /// The declared type, ignoring `null` in type lists.
    pub fn type_name(&self) -> Option<&str> {
        match self.ty.as_ref()? {
            SchemaType::Single(ty) => Some(ty.as_str()),
            SchemaType::Multiple(types) => types
                .iter()
                .map(String::as_str)
                .find(|ty| *ty != "null"),
        }
    }
}

/// Returns the last segment of a `$ref`, which is the name of the referenced definition.
///
/// Both local (`#/components/schemas/Supi`) and external references
/// (`TS29571_CommonData.yaml#/components/schemas/Supi`) resolve to `Supi`.
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}
