//! A fully resolved request.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::catalog::{Method, is_path_parameter};

/// The default `Content-Type` and `Accept` value.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A parameter with its resolved value.
///
/// The value is empty for optional parameters without a configured value. Those stay in the plan
/// for reporting. An empty path parameter drops out of the path, an empty query parameter is not
/// sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamValue {
    /// The parameter name.
    pub name: String,
    /// The resolved value, possibly empty.
    pub value: String,
}

/// Everything needed to send one API request.
///
/// Plans are built by the request assembler before any network call. The base URL is filled in
/// afterwards by discovery.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionPlan {
    /// The target NF.
    pub nf: String,
    /// The operation name in the catalog.
    pub api_name: String,
    /// HTTP method.
    pub method: Method,
    /// Base path of the service that declares the operation.
    pub service_path: String,
    /// Operation path template.
    pub path: String,
    /// Base URL of the target NF, set by discovery.
    pub base_url: Option<String>,
    /// All declared parameters with their resolved values, in declaration order.
    pub parameters: Vec<ParamValue>,
    /// The JSON request body.
    pub body: Option<Value>,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
}

impl ExecutionPlan {
    /// Creates a plan without parameters, body, or headers.
    pub fn new(
        nf: impl Into<String>,
        api_name: impl Into<String>,
        method: Method,
        service_path: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            nf: nf.into(),
            api_name: api_name.into(),
            method,
            service_path: service_path.into(),
            path: path.into(),
            base_url: None,
            parameters: Vec::new(),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    /// Sets a header, replacing any existing header with the same name regardless of case.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    /// Parameters that are substituted into the path template.
    ///
    /// A parameter is a path parameter exactly if its placeholder occurs in the template.
    pub fn path_parameters(&self) -> impl Iterator<Item = &ParamValue> {
        self.parameters
            .iter()
            .filter(|p| is_path_parameter(&p.name, &self.path))
    }

    /// Parameters that are appended to the query string. Empty values are skipped.
    pub fn query_parameters(&self) -> impl Iterator<Item = &ParamValue> {
        self.parameters
            .iter()
            .filter(|p| !p.value.is_empty() && !is_path_parameter(&p.name, &self.path))
    }

    /// The operation path with all path parameters substituted.
    pub fn resolved_path(&self) -> String {
        substitute_path(&self.path, self.path_parameters())
    }
}

/// Replaces `{name}` placeholders in `path` with parameter values.
///
/// Empty values remove the placeholder, and the `//` left behind collapses into a single slash.
pub fn substitute_path<'a>(path: &str, params: impl IntoIterator<Item = &'a ParamValue>) -> String {
    let mut path = params.into_iter().fold(path.to_owned(), |path, p| {
        path.replace(&format!("{{{}}}", p.name), &p.value)
    });
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    path
}
