//! NF discovery through the NRF `nnrf-disc` service.
//!
//! The NRF is asked for instances of the target NF type, and a base URL is derived from the
//! profile of the selected instance. Registered instances are preferred.

use std::time::Duration;

use nfbench_types::plan::JSON_CONTENT_TYPE;
use nfbench_types::profile::{NfProfile, SearchResult};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use url::Url;

use crate::DiscoveryError;

/// Path of the discovery resource relative to the NRF base URL.
pub const DISCOVERY_PATH: &str = "nnrf-disc/v1/nf-instances";

/// Timeout used for discovery requests unless configured otherwise.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// The NF that issues the discovery request.
///
/// Both fields are sent only if set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Requester {
    /// Sent as `requester-nf-type`.
    pub nf_type: Option<String>,
    /// Sent as `requester-nf-instance-id`.
    pub instance_id: Option<String>,
}

/// A client for the NRF discovery service.
#[derive(Clone, Debug)]
pub struct DiscoveryClient {
    nrf_url: String,
    endpoint: Url,
    reqwest: reqwest::Client,
    timeout: Duration,
}

impl DiscoveryClient {
    /// Creates a discovery client for the NRF at `nrf_url`.
    pub fn new(nrf_url: &str, timeout: Duration) -> Result<Self, DiscoveryError> {
        Self::with_client(nrf_url, crate::http_client()?, timeout)
    }

    /// Creates a discovery client that uses the given HTTP client.
    pub fn with_client(
        nrf_url: &str,
        reqwest: reqwest::Client,
        timeout: Duration,
    ) -> Result<Self, DiscoveryError> {
        let nrf_url = nrf_url.trim().trim_end_matches('/').to_owned();
        let endpoint = Url::parse(&format!("{nrf_url}/{DISCOVERY_PATH}")).map_err(|err| {
            DiscoveryError::InvalidUrl {
                message: format!("{nrf_url}: {err}"),
            }
        })?;

        Ok(Self {
            nrf_url,
            endpoint,
            reqwest,
            timeout,
        })
    }

    /// The NRF base URL, without a trailing slash.
    pub fn nrf_url(&self) -> &str {
        &self.nrf_url
    }

    /// Queries the NRF for all instances of `target_nf_type`.
    pub async fn search(
        &self,
        target_nf_type: &str,
        requester: &Requester,
    ) -> Result<SearchResult, DiscoveryError> {
        let mut query = vec![("target-nf-type", target_nf_type.to_uppercase())];
        if let Some(nf_type) = requester.nf_type.as_ref().filter(|s| !s.is_empty()) {
            query.push(("requester-nf-type", nf_type.clone()));
        }
        if let Some(id) = requester.instance_id.as_ref().filter(|s| !s.is_empty()) {
            query.push(("requester-nf-instance-id", id.clone()));
        }

        tracing::debug!(endpoint = %self.endpoint, ?query, "querying NRF");
        let response = self
            .reqwest
            .get(self.endpoint.clone())
            .query(&query)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(DiscoveryError::Status { status, body });
        }

        serde_json::from_str(&body).map_err(DiscoveryError::Parse)
    }

    /// Discovers the base URL of an instance of `target_nf_type`.
    ///
    /// Discovering the NRF itself returns the configured NRF URL without a request.
    pub async fn discover(
        &self,
        target_nf_type: &str,
        requester: &Requester,
    ) -> Result<String, DiscoveryError> {
        if target_nf_type.eq_ignore_ascii_case("NRF") {
            return Ok(self.nrf_url.clone());
        }

        let result = self.search(target_nf_type, requester).await?;
        let url = select_base_url(target_nf_type, &result)?;
        tracing::info!(nf = target_nf_type, %url, "discovered NF");
        Ok(url)
    }
}

/// Selects the base URL from a discovery result.
///
/// The first registered instance with a usable address wins. If there is none, the first instance
/// is used regardless of its status.
pub fn select_base_url(nf_type: &str, result: &SearchResult) -> Result<String, DiscoveryError> {
    let first = result
        .nf_instances
        .first()
        .ok_or_else(|| DiscoveryError::NotFound {
            nf_type: nf_type.to_owned(),
        })?;

    let registered = result
        .nf_instances
        .iter()
        .filter(|profile| profile.is_registered())
        .find_map(NfProfile::base_url);
    if let Some(url) = registered {
        return Ok(url);
    }

    let url = first.base_url().ok_or_else(|| DiscoveryError::NoEndpoint {
        nf_type: nf_type.to_owned(),
        instance_id: first.nf_instance_id.clone(),
    })?;
    tracing::warn!(
        instance = %first.nf_instance_id,
        status = %first.nf_status,
        %url,
        "no registered instance with an endpoint, falling back to the first instance"
    );
    Ok(url)
}
