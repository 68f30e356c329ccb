//! Sends the request described by an [`ExecutionPlan`].

use std::time::{Duration, Instant};

use nfbench_types::{ExecutionPlan, Method};
use url::Url;

use crate::RequestError;

/// Timeout used for API requests unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes planned requests.
#[derive(Clone, Debug)]
pub struct Executor {
    reqwest: reqwest::Client,
    timeout: Duration,
}

impl Executor {
    /// Creates an executor with its own HTTP client.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self::with_client(crate::http_client()?, timeout))
    }

    /// Creates an executor that uses the given HTTP client.
    pub fn with_client(reqwest: reqwest::Client, timeout: Duration) -> Self {
        Self { reqwest, timeout }
    }

    /// The timeout applied to each request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends the request once.
    ///
    /// Returns the time until the full response was received along with the outcome. Responses
    /// with a status of 400 or above are failures.
    pub async fn call(&self, plan: &ExecutionPlan) -> (Duration, Result<(), RequestError>) {
        let start = Instant::now();
        let result = self.send(plan).await;
        (start.elapsed(), result)
    }

    async fn send(&self, plan: &ExecutionPlan) -> Result<(), RequestError> {
        let url = request_url(plan)?;
        tracing::trace!(method = %plan.method, %url, "sending request");

        let mut builder = self
            .reqwest
            .request(http_method(plan.method), url)
            .timeout(self.timeout);
        for (name, value) in &plan.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &plan.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestError::Status { status, body });
        }

        response.bytes().await?;
        Ok(())
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

/// Joins URL parts with exactly one slash between them, skipping empty parts.
fn join_url(base: &str, parts: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_owned();
    for part in parts {
        let part = part.trim_matches('/');
        if !part.is_empty() {
            url.push('/');
            url.push_str(part);
        }
    }
    url
}

/// Builds the final request URL of a plan.
///
/// The URL is the base URL, the service path and the operation path with path parameters
/// substituted. All other parameters with a value are appended as query pairs.
pub fn request_url(plan: &ExecutionPlan) -> Result<Url, RequestError> {
    let base = plan
        .base_url
        .as_deref()
        .ok_or_else(|| RequestError::MissingBaseUrl {
            nf: plan.nf.clone(),
        })?;

    let path = plan.resolved_path();
    let joined = join_url(base, &[plan.service_path.as_str(), path.as_str()]);
    let mut url = Url::parse(&joined).map_err(|err| RequestError::InvalidUrl {
        message: format!("invalid request URL {joined}: {err}"),
    })?;

    let mut query = plan.query_parameters().peekable();
    if query.peek().is_some() {
        url.query_pairs_mut()
            .extend_pairs(query.map(|p| (p.name.as_str(), p.value.as_str())));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use nfbench_types::plan::ParamValue;

    use super::*;

    fn plan() -> ExecutionPlan {
        let mut plan = ExecutionPlan::new(
            "UDM",
            "GetAmData",
            Method::Get,
            "/nudm-sdm/v2/",
            "/{supi}/am-data",
        );
        plan.base_url = Some("http://10.0.0.5:8000/".into());
        plan.parameters = vec![
            ParamValue {
                name: "supi".into(),
                value: "imsi-208930000000001".into(),
            },
            ParamValue {
                name: "plmn-id".into(),
                value: "".into(),
            },
            ParamValue {
                name: "dataset-names".into(),
                value: "AM,SMF_SEL".into(),
            },
        ];
        plan
    }

    #[test]
    fn joins_with_single_slashes() {
        assert_eq!(join_url("http://h/", &["/a/", "", "/b"]), "http://h/a/b");
        assert_eq!(join_url("http://h", &["", "c"]), "http://h/c");
    }

    #[test]
    fn builds_url_with_path_and_query() {
        let url = request_url(&plan()).unwrap();
        assert_eq!(
            url.as_str(),
            "http://10.0.0.5:8000/nudm-sdm/v2/imsi-208930000000001/am-data?dataset-names=AM%2CSMF_SEL"
        );
    }

    #[test]
    fn no_query_without_values() {
        let mut plan = plan();
        plan.parameters.truncate(2);
        let url = request_url(&plan).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn empty_path_parameter_leaves_no_placeholder() {
        let mut plan = plan();
        plan.path = "/items/{supi}/data".into();
        plan.parameters[0].value.clear();

        let url = request_url(&plan).unwrap();
        assert_eq!(
            url.as_str(),
            "http://10.0.0.5:8000/nudm-sdm/v2/items/data?dataset-names=AM%2CSMF_SEL"
        );
        assert!(url.query_pairs().all(|(name, _)| name != "supi"));
    }

    #[test]
    fn requires_base_url() {
        let mut plan = plan();
        plan.base_url = None;
        assert!(matches!(
            request_url(&plan),
            Err(RequestError::MissingBaseUrl { nf }) if nf == "UDM"
        ));
    }

    #[test]
    fn rejects_invalid_base_url() {
        let mut plan = plan();
        plan.base_url = Some("10.0.0.5".into());
        assert!(matches!(
            request_url(&plan),
            Err(RequestError::InvalidUrl { .. })
        ));
    }
}
