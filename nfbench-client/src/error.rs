use reqwest::StatusCode;

/// Errors discovering an NF instance through the NRF.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The NRF URL is not a valid URL.
    #[error("invalid NRF URL: {message}")]
    InvalidUrl {
        /// The URL error message.
        message: String,
    },
    /// The NRF could not be reached or the response could not be read.
    #[error("failed to query NRF: {0}")]
    Request(#[from] reqwest::Error),
    /// The NRF responded with a non-success status.
    #[error("NRF responded with {status}: {body}")]
    Status {
        /// The response status.
        status: StatusCode,
        /// The response body, for diagnostics.
        body: String,
    },
    /// The response body is not a valid search result.
    #[error("failed to parse NRF response: {0}")]
    Parse(#[source] serde_json::Error),
    /// The NRF knows no instance of the requested type.
    #[error("no {nf_type} instances found")]
    NotFound {
        /// The requested NF type.
        nf_type: String,
    },
    /// An instance was found but no address could be derived from its profile.
    #[error("no usable endpoint in {nf_type} instance '{instance_id}'")]
    NoEndpoint {
        /// The requested NF type.
        nf_type: String,
        /// The selected instance.
        instance_id: String,
    },
}

/// Errors executing a single request.
///
/// These never abort a benchmark, they only count as failed iterations.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The plan has no base URL yet.
    #[error("no base URL for {nf}, run discovery first")]
    MissingBaseUrl {
        /// The target NF.
        nf: String,
    },
    /// Error when URL construction fails.
    #[error("{message}")]
    InvalidUrl {
        /// The URL error message.
        message: String,
    },
    /// Connection failures, timeouts and other transport errors.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server responded with a status of 400 or above.
    #[error("server responded with {status}")]
    Status {
        /// The response status.
        status: StatusCode,
        /// The response body, for diagnostics.
        body: String,
    },
}
