//! NF profiles as returned by the NRF discovery service (`nnrf-disc`).
//!
//! Only the fields needed to derive a base URL are modeled, everything else in the response is
//! ignored.

use serde::{Deserialize, Serialize};

/// The NF status that marks an instance as ready to serve.
pub const STATUS_REGISTERED: &str = "REGISTERED";

/// Port assumed when an address is given without one.
pub const DEFAULT_PORT: u16 = 80;

/// The response body of an NF discovery request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Validity of the result in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_period: Option<u64>,
    /// All matching NF instances.
    #[serde(default)]
    pub nf_instances: Vec<NfProfile>,
}

/// A single NF instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfProfile {
    /// Instance identifier.
    #[serde(default)]
    pub nf_instance_id: String,
    /// NF type, such as `AUSF`.
    #[serde(default)]
    pub nf_type: String,
    /// NF status, such as `REGISTERED` or `SUSPENDED`.
    #[serde(default)]
    pub nf_status: String,
    /// FQDN of the instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    /// IPv4 addresses of the instance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv4_addresses: Vec<String>,
    /// IPv6 addresses of the instance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv6_addresses: Vec<String>,
    /// Services offered by the instance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nf_services: Vec<NfService>,
}

/// A service offered by an NF instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfService {
    /// Service instance identifier.
    #[serde(default)]
    pub service_instance_id: String,
    /// Service name, such as `nausf-auth`.
    #[serde(default)]
    pub service_name: String,
    /// URI scheme, `http` or `https`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// FQDN of the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    /// Endpoints the service listens on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_end_points: Vec<IpEndPoint>,
    /// Optional API prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_prefix: Option<String>,
}

/// An IP endpoint of a service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpEndPoint {
    /// IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_address: Option<String>,
    /// IPv6 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_address: Option<String>,
    /// Transport protocol, such as `TCP`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
    /// Port number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl IpEndPoint {
    fn base_url(&self) -> Option<String> {
        let port = self.port.filter(|port| *port > 0)?;
        if let Some(ipv4) = self.ipv4_address.as_deref().filter(|a| !a.is_empty()) {
            return Some(format!("http://{ipv4}:{port}"));
        }
        if let Some(ipv6) = self.ipv6_address.as_deref().filter(|a| !a.is_empty()) {
            return Some(format!("http://[{ipv6}]:{port}"));
        }
        None
    }
}

impl NfProfile {
    /// Returns `true` if the instance is registered.
    pub fn is_registered(&self) -> bool {
        self.nf_status == STATUS_REGISTERED
    }

    /// Derives the base URL of this instance.
    ///
    /// In order of preference:
    /// 1. the first service endpoint with an address and port,
    /// 2. the first IPv4 address of the instance on port 80,
    /// 3. the first IPv6 address of the instance on port 80,
    /// 4. the FQDN of the instance on port 80.
    pub fn base_url(&self) -> Option<String> {
        let endpoint = self
            .nf_services
            .iter()
            .flat_map(|service| &service.ip_end_points)
            .find_map(IpEndPoint::base_url);
        if endpoint.is_some() {
            return endpoint;
        }

        if let Some(ipv4) = self.ipv4_addresses.iter().find(|a| !a.is_empty()) {
            return Some(format!("http://{ipv4}:{DEFAULT_PORT}"));
        }
        if let Some(ipv6) = self.ipv6_addresses.iter().find(|a| !a.is_empty()) {
            return Some(format!("http://[{ipv6}]:{DEFAULT_PORT}"));
        }

        self.fqdn
            .as_deref()
            .filter(|fqdn| !fqdn.is_empty())
            .map(|fqdn| format!("http://{fqdn}:{DEFAULT_PORT}"))
    }
}
