//! HTTP side of nfbench: NF discovery through the NRF, request execution and benchmarking.
//!
//! ```no_run
//! # async fn run(mut plan: nfbench_types::ExecutionPlan) -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//!
//! use nfbench_client::{DiscoveryClient, Executor, Requester};
//!
//! let discovery = DiscoveryClient::new("http://nrf:8000", Duration::from_secs(10))?;
//! plan.base_url = Some(discovery.discover("AUSF", &Requester::default()).await?);
//!
//! let executor = Executor::new(Duration::from_secs(30))?;
//! let result = nfbench_client::benchmark::run(&executor, &plan, 10).await;
//! println!("{} of {} requests succeeded", result.success, result.total);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod benchmark;
pub mod discovery;
mod error;
pub mod executor;

pub use benchmark::BenchmarkResult;
pub use discovery::{DiscoveryClient, Requester};
pub use error::*;
pub use executor::Executor;

const USER_AGENT: &str = concat!("nfbench/", env!("CARGO_PKG_VERSION"));

/// Creates the HTTP client shared by discovery and execution.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}
