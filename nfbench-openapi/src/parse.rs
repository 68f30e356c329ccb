//! Loading OpenAPI documents and building the operation catalog.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use nfbench_types::catalog::{BodyDescriptor, ServiceEntry};
use nfbench_types::{ApiEntry, Catalog, Method, ParamDescriptor, ParamLocation};
use serde_json::json;

use crate::definitions::Definitions;
use crate::document::{OpenApiDocument, Operation, Parameter, PathItem, Schema, ref_name};
use crate::naming;

/// Errors loading OpenAPI documents.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The specification directory could not be listed.
    #[error("failed to read directory {}: {source}", .path.display())]
    ReadDir {
        /// The directory.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// A document could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFile {
        /// The document file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// A document is not valid YAML.
    #[error("failed to parse {}: {source}", .path.display())]
    Yaml {
        /// The document file.
        path: PathBuf,
        /// The underlying error.
        source: serde_yaml::Error,
    },
}

/// Returns `true` for files with a `.yaml` or `.yml` extension.
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Reads a single document.
///
/// Returns `Ok(None)` for YAML files that are not OpenAPI documents, such as the catalog itself.
pub fn parse_file(path: &Path) -> Result<Option<OpenApiDocument>, ParseError> {
    let contents = fs::read_to_string(path).map_err(|source| ParseError::ReadFile {
        path: path.to_owned(),
        source,
    })?;
    let document: OpenApiDocument =
        serde_yaml::from_str(&contents).map_err(|source| ParseError::Yaml {
            path: path.to_owned(),
            source,
        })?;
    Ok(document.openapi.is_some().then_some(document))
}

/// A loaded document with its location.
#[derive(Clone, Debug)]
pub struct SpecFile {
    /// Where the document was loaded from.
    pub path: PathBuf,
    /// The parsed document.
    pub document: OpenApiDocument,
}

/// A document interpreted as the service of an NF.
#[derive(Clone, Copy, Debug)]
pub struct ServiceSpec<'a> {
    /// The inferred NF name, or `UNKNOWN`.
    pub nf: &'a str,
    /// The derived service name.
    pub name: &'a str,
    /// The source document.
    pub file: &'a SpecFile,
}

/// A single operation of a service document.
#[derive(Clone, Copy, Debug)]
pub struct OperationSpec<'a> {
    /// Path template of the operation.
    pub path: &'a str,
    /// HTTP method.
    pub method: Method,
    /// The path item that declares the operation.
    pub item: &'a PathItem,
    /// The operation.
    pub operation: &'a Operation,
}

impl<'a> ServiceSpec<'a> {
    /// Iterates all operations in path order.
    pub fn operations(self) -> impl Iterator<Item = OperationSpec<'a>> {
        self.file.document.paths.iter().flat_map(|(path, item)| {
            item.operations().map(move |(method, operation)| OperationSpec {
                path,
                method,
                item,
                operation,
            })
        })
    }
}

/// All documents of a specification directory.
#[derive(Debug, Default)]
pub struct SpecSet {
    files: Vec<SpecFile>,
    services: Vec<(String, String)>,
    definitions: Definitions,
}

impl SpecSet {
    /// Creates a set from already parsed documents.
    pub fn new(files: Vec<SpecFile>) -> Self {
        let definitions = Definitions::from_documents(files.iter().map(|f| &f.document));
        let services = files
            .iter()
            .map(|f| {
                let nf = naming::infer_nf_name(&f.document);
                let name = naming::service_name(&f.document);
                (nf, name)
            })
            .collect();

        Self {
            files,
            services,
            definitions,
        }
    }

    /// Loads all YAML documents in a directory, in file name order.
    ///
    /// Only listing the directory itself is fatal. Documents that cannot be read or parsed are
    /// logged and skipped, and YAML files without an `openapi` field are ignored.
    pub fn load_dir(dir: &Path) -> Result<Self, ParseError> {
        let read_dir_error = |source: std::io::Error| ParseError::ReadDir {
            path: dir.to_owned(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_dir_error)? {
            let path = entry.map_err(read_dir_error)?.path();
            if path.is_file() && is_yaml_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match parse_file(&path) {
                Ok(Some(document)) => files.push(SpecFile { path, document }),
                Ok(None) => tracing::debug!(path = %path.display(), "not an OpenAPI document"),
                Err(error) => {
                    tracing::warn!(
                        error = &error as &dyn std::error::Error,
                        "skipping specification"
                    );
                }
            }
        }

        tracing::info!(documents = files.len(), dir = %dir.display(), "loaded specifications");
        Ok(Self::new(files))
    }

    /// Returns `true` if no documents were loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The shared definition registry.
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Iterates the services, optionally restricted to a single NF (case-insensitive).
    pub fn services<'a>(
        &'a self,
        nf_filter: Option<&'a str>,
    ) -> impl Iterator<Item = ServiceSpec<'a>> + 'a {
        self.files
            .iter()
            .zip(&self.services)
            .map(|(file, (nf, name))| ServiceSpec { nf, name, file })
            .filter(move |service| nf_filter.is_none_or(|nf| service.nf.eq_ignore_ascii_case(nf)))
    }

    /// Builds the catalog, optionally restricted to a single NF.
    ///
    /// Documents that resolve to the same NF and service name are merged. Operations are keyed by
    /// `operationId`, or by a name generated from method and path. If a key is already taken within
    /// the service, the method is appended, followed by a counter if that is taken as well.
    pub fn catalog(&self, nf_filter: Option<&str>) -> Catalog {
        let mut services: BTreeMap<(String, String), ServiceEntry> = BTreeMap::new();

        for service in self.services(nf_filter) {
            let document = &service.file.document;
            let entry = services
                .entry((service.nf.to_owned(), service.name.to_owned()))
                .or_insert_with(|| {
                    let path = naming::service_base_path(document);
                    ServiceEntry {
                        version: naming::version_from_path(&path),
                        path,
                        description: Some(naming::service_description(document)),
                        apis: BTreeMap::new(),
                    }
                });

            for op in service.operations() {
                let name = op
                    .operation
                    .operation_id
                    .clone()
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| naming::generated_api_name(op.method, op.path));
                let name = unique_api_name(&entry.apis, name, op.method);

                let api = self.api_entry(&op);
                entry.apis.insert(name, api);
            }
        }

        let mut catalog = Catalog::new();
        for ((nf, name), service) in services {
            // Shared definition documents declare no operations.
            if service.apis.is_empty() {
                continue;
            }
            tracing::debug!(%nf, service = %name, apis = service.apis.len(), "cataloged service");
            catalog.insert_service(nf, name, service);
        }
        catalog
    }

    fn api_entry(&self, op: &OperationSpec<'_>) -> ApiEntry {
        let parameters = self
            .parameters(op)
            .iter()
            .map(|param| self.param_descriptor(param))
            .collect();
        let (request_body, request_body_schema) = self.request_body(op.operation);

        ApiEntry {
            path: op.path.to_owned(),
            method: op.method,
            parameters,
            request_body,
            request_body_schema,
        }
    }

    /// Returns the effective parameters of an operation.
    ///
    /// Path-level parameters are merged with operation parameters, where the operation wins for the
    /// same name and location. References are resolved, cookie parameters are dropped, and path
    /// placeholders without a declaration are added as required path parameters.
    pub fn parameters(&self, op: &OperationSpec<'_>) -> Vec<Parameter> {
        let mut merged: Vec<Parameter> = Vec::new();

        let declared = op.item.parameters.iter().chain(&op.operation.parameters);
        for parameter in declared {
            let Some(parameter) = self.definitions.resolve_parameter(parameter) else {
                tracing::debug!(
                    reference = parameter.reference.as_deref(),
                    path = op.path,
                    "unresolved parameter reference"
                );
                continue;
            };
            if parameter.name.is_empty() || parameter.location == "cookie" {
                continue;
            }

            let existing = merged
                .iter_mut()
                .find(|p| p.name == parameter.name && p.location == parameter.location);
            match existing {
                Some(existing) => *existing = parameter.clone(),
                None => merged.push(parameter.clone()),
            }
        }

        for placeholder in path_placeholders(op.path) {
            if !merged.iter().any(|p| p.name == placeholder) {
                merged.push(Parameter {
                    name: placeholder.to_owned(),
                    location: "path".to_owned(),
                    required: true,
                    ..Default::default()
                });
            }
        }

        merged
    }

    fn param_descriptor(&self, parameter: &Parameter) -> ParamDescriptor {
        let location = match parameter.location.as_str() {
            "path" => ParamLocation::Path,
            "header" => ParamLocation::Header,
            _ => ParamLocation::Query,
        };
        let ty = parameter
            .schema
            .as_ref()
            .and_then(|schema| self.definitions.resolve(schema).type_name())
            .unwrap_or("string");

        ParamDescriptor {
            name: parameter.name.clone(),
            required: parameter.required || location == ParamLocation::Path,
            ty: ty.to_owned(),
            location,
        }
    }

    /// Determines the request body type name and descriptor of an operation.
    pub fn request_body(&self, operation: &Operation) -> (Option<String>, BodyDescriptor) {
        let Some(schema) = operation
            .request_body
            .as_ref()
            .and_then(|body| body.json_schema())
        else {
            return (None, BodyDescriptor::default());
        };

        if let Some(reference) = schema.reference.as_deref() {
            let name = ref_name(reference).to_owned();
            let descriptor = match self.definitions.schema(reference) {
                Some(definition) => BodyDescriptor {
                    schema_name: Some(name.clone()),
                    required_fields: self.definitions.object_shape(definition).required,
                    schema: serde_json::to_value(definition).ok(),
                },
                None => BodyDescriptor {
                    schema_name: Some(name.clone()),
                    ..Default::default()
                },
            };
            return (Some(name), descriptor);
        }

        if schema.type_name() == Some("array") {
            let descriptor = BodyDescriptor {
                schema: Some(json!({
                    "type": "array",
                    "description": "JSON Patch array for updates",
                })),
                ..Default::default()
            };
            return (Some("patch_request".to_owned()), descriptor);
        }

        (Some(infer_body_type(operation).to_owned()), BodyDescriptor::default())
    }

    /// Resolves the named schema of a request body, if it has one.
    pub fn body_schema(&self, operation: &Operation) -> Option<(String, &Schema)> {
        let reference = operation
            .request_body
            .as_ref()?
            .json_schema()?
            .reference
            .as_deref()?;
        let schema = self.definitions.schema(reference)?;
        Some((ref_name(reference).to_owned(), schema))
    }
}

/// Guesses a request body type from the operation id and summary.
fn infer_body_type(operation: &Operation) -> &'static str {
    let text = format!(
        "{} {}",
        operation.operation_id.as_deref().unwrap_or_default(),
        operation.summary.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    if text.contains("register") && text.contains("nf") {
        "nf_profile"
    } else if text.contains("update") && text.contains("nf") {
        "patch_request"
    } else if text.contains("auth") {
        "authentication_info"
    } else if text.contains("subscription") {
        "subscription_data"
    } else if text.contains("session") || text.contains("pdu") {
        "pdu_session_info"
    } else {
        "default_request"
    }
}

/// Iterates the `{name}` placeholders of a path template.
pub fn path_placeholders(path: &str) -> impl Iterator<Item = &str> {
    path.split('{')
        .skip(1)
        .filter_map(|rest| rest.split_once('}'))
        .map(|(name, _)| name)
        .filter(|name| !name.is_empty())
}

/// Picks a name for an operation that is not yet used in `apis`.
fn unique_api_name(apis: &BTreeMap<String, ApiEntry>, name: String, method: Method) -> String {
    if !apis.contains_key(&name) {
        return name;
    }

    let with_method = format!("{name}_{method}");
    if !apis.contains_key(&with_method) {
        return with_method;
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{with_method}_{counter}");
        if !apis.contains_key(&candidate) {
            tracing::warn!(api = %name, renamed = %candidate, "duplicate operation name");
            return candidate;
        }
        counter += 1;
    }
}
