//! The persisted catalog of NF operations.
//!
//! The catalog is a tree of `NF -> Service -> API`. It is built once from OpenAPI documents and
//! written to `api_list.yaml`, which decouples specification parsing from execution. The execution
//! path only ever reads it.
//!
//! ```yaml
//! AUSF:
//!   UEAuthentication:
//!     path: /nausf-auth/v1
//!     version: v1
//!     apis:
//!       Delete5gAkaAuthenticationResult:
//!         path: /ue-authentications/{authCtxId}/5g-aka-confirmation
//!         method: DELETE
//!         parameters:
//!         - name: authCtxId
//!           required: true
//!           type: string
//!           in: path
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Sentinel NF name for documents whose network function could not be inferred.
pub const UNKNOWN_NF: &str = "UNKNOWN";

const CATALOG_HEADER: &str = "\
# =============================================================================
# API LIST - 5G Core Network Functions API Catalog
# =============================================================================
# This file is generated by `nfbench build` from OpenAPI specifications.
# It lists the available APIs organized by NF (Network Function):
#
#   NF_NAME:
#     SERVICE_NAME:
#       path: /service-base-path/version
#       version: v1
#       apis:
#         API_NAME:
#           path: /api-specific-path
#           method: HTTP_METHOD
#           parameters: [list of parameters]
#           request_body: request_body_schema_name
# =============================================================================

";

/// Errors reading or writing the catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read or written.
    #[error("failed to access catalog file: {0}")]
    Io(#[from] std::io::Error),
    /// The catalog file is not valid YAML or does not match the catalog structure.
    #[error("failed to parse catalog file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors looking up an operation in the catalog.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LookupError {
    /// No services are registered for this NF.
    #[error("NF '{0}' not found in catalog")]
    UnknownNf(String),
    /// The NF exists but none of its services declares the API.
    #[error("API '{api}' not found in NF '{nf}'")]
    UnknownApi {
        /// The NF that was searched.
        nf: String,
        /// The API name that was requested.
        api: String,
    },
}

/// HTTP method of a catalog operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl Method {
    /// Returns the upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is placed in the outgoing request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Substituted into the `{name}` placeholder of the path template.
    Path,
    /// Appended to the query string.
    #[default]
    Query,
    /// Declared as a header parameter in the specification.
    Header,
}

/// Returns `true` if `{name}` literally occurs in the path template.
pub fn is_path_parameter(name: &str, path: &str) -> bool {
    path.contains(&format!("{{{name}}}"))
}

fn default_param_type() -> String {
    "string".to_owned()
}

/// A declared parameter of an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// The parameter name, as used in path placeholders and query strings.
    pub name: String,
    /// Whether execution must be refused when no value is configured.
    #[serde(default)]
    pub required: bool,
    /// The schema type declared in the specification, `string` if absent.
    #[serde(rename = "type", default = "default_param_type")]
    pub ty: String,
    /// The declared location of the parameter.
    #[serde(rename = "in", default)]
    pub location: ParamLocation,
}

impl ParamDescriptor {
    /// Creates a descriptor for a parameter without a declared location.
    ///
    /// Parameters that occur as `{name}` in the path are path parameters and required, all others
    /// are optional query parameters.
    pub fn inferred(name: impl Into<String>, path: &str) -> Self {
        let name = name.into();
        let in_path = is_path_parameter(&name, path);
        Self {
            required: in_path,
            ty: default_param_type(),
            location: if in_path {
                ParamLocation::Path
            } else {
                ParamLocation::Query
            },
            name,
        }
    }
}

/// Request body metadata of an operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    /// Name of the referenced schema in `components/schemas`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// Fields the schema marks as required. Only these are sent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    /// The schema definition, kept for generating user-facing templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

impl BodyDescriptor {
    /// Returns `true` if the descriptor carries no information.
    pub fn is_empty(&self) -> bool {
        self.schema_name.is_none() && self.required_fields.is_empty() && self.schema.is_none()
    }
}

/// A single operation in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ApiEntryFile")]
pub struct ApiEntry {
    /// Operation path template relative to the service base path.
    pub path: String,
    /// HTTP method.
    pub method: Method,
    /// All declared parameters, in declaration order.
    #[serde(default)]
    pub parameters: Vec<ParamDescriptor>,
    /// Request body type name, used to pick a default body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    /// Request body schema metadata.
    #[serde(default, skip_serializing_if = "BodyDescriptor::is_empty")]
    pub request_body_schema: BodyDescriptor,
}

/// A parameter as written in the catalog file, where `in` may be left out.
#[derive(Deserialize)]
struct ParamFile {
    name: String,
    #[serde(default)]
    required: bool,
    #[serde(rename = "type", default = "default_param_type")]
    ty: String,
    #[serde(rename = "in", default)]
    location: Option<ParamLocation>,
}

#[derive(Deserialize)]
struct ApiEntryFile {
    path: String,
    method: Method,
    #[serde(default)]
    parameters: Vec<ParamFile>,
    #[serde(default)]
    request_body: Option<String>,
    #[serde(default)]
    request_body_schema: BodyDescriptor,
}

impl From<ApiEntryFile> for ApiEntry {
    fn from(file: ApiEntryFile) -> Self {
        let ApiEntryFile {
            path,
            method,
            parameters,
            request_body,
            request_body_schema,
        } = file;

        let parameters = parameters
            .into_iter()
            .map(|param| match param.location {
                Some(location) => ParamDescriptor {
                    name: param.name,
                    required: param.required,
                    ty: param.ty,
                    location,
                },
                None => {
                    let inferred = ParamDescriptor::inferred(param.name, &path);
                    ParamDescriptor {
                        required: param.required || inferred.required,
                        ty: param.ty,
                        ..inferred
                    }
                }
            })
            .collect();

        Self {
            path,
            method,
            parameters,
            request_body,
            request_body_schema,
        }
    }
}

/// A service of an NF together with its operations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// Base path of the service, such as `/nausf-auth/v1`.
    pub path: String,
    /// API version extracted from the base path.
    pub version: String,
    /// First sentence of the service description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operations by name.
    #[serde(default)]
    pub apis: BTreeMap<String, ApiEntry>,
}

/// A catalog operation resolved by [`Catalog::lookup`].
#[derive(Clone, Copy, Debug)]
pub struct ApiRef<'a> {
    /// The NF name as stored in the catalog.
    pub nf: &'a str,
    /// The name of the service that declares the operation.
    pub service_name: &'a str,
    /// The service that declares the operation.
    pub service: &'a ServiceEntry,
    /// The operation itself.
    pub api: &'a ApiEntry,
}

/// Services of a single NF, by service name.
pub type NfServices = BTreeMap<String, ServiceEntry>;

/// The `NF -> Service -> API` catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    nfs: BTreeMap<String, NfServices>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the catalog contains no NFs.
    pub fn is_empty(&self) -> bool {
        self.nfs.is_empty()
    }

    /// Adds or replaces a service of the given NF.
    pub fn insert_service(
        &mut self,
        nf: impl Into<String>,
        service_name: impl Into<String>,
        service: ServiceEntry,
    ) {
        self.nfs
            .entry(nf.into())
            .or_default()
            .insert(service_name.into(), service);
    }

    /// Iterates NFs and their services in name order.
    pub fn nfs(&self) -> impl Iterator<Item = (&str, &NfServices)> {
        self.nfs.iter().map(|(nf, services)| (nf.as_str(), services))
    }

    /// Finds the services of an NF, matching the name case-insensitively.
    pub fn nf(&self, nf: &str) -> Option<(&str, &NfServices)> {
        self.nfs
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(nf))
            .map(|(name, services)| (name.as_str(), services))
    }

    /// Looks up an operation by NF and API name.
    ///
    /// The NF is matched case-insensitively, the API name exactly. All services of the NF are
    /// searched in name order and the first match wins.
    pub fn lookup(&self, nf: &str, api_name: &str) -> Result<ApiRef<'_>, LookupError> {
        let (nf_name, services) = self
            .nf(nf)
            .ok_or_else(|| LookupError::UnknownNf(nf.to_owned()))?;

        services
            .iter()
            .find_map(|(service_name, service)| {
                let api = service.apis.get(api_name)?;
                Some(ApiRef {
                    nf: nf_name,
                    service_name,
                    service,
                    api,
                })
            })
            .ok_or_else(|| LookupError::UnknownApi {
                nf: nf_name.to_owned(),
                api: api_name.to_owned(),
            })
    }

    /// Parses a catalog from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        // An empty document deserializes to `null`, which is an empty catalog.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serializes the catalog to YAML, including the explanatory header.
    pub fn to_yaml(&self) -> Result<String, CatalogError> {
        let body = serde_yaml::to_string(self)?;
        Ok(format!("{CATALOG_HEADER}{body}"))
    }

    /// Loads the catalog from a file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Writes the catalog to a file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_yaml()?)?;
        tracing::debug!(path = %path.display(), "wrote catalog");
        Ok(())
    }
}
