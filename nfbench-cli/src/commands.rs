//! Implementation of the `list`, `build` and `run` commands.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use nfbench_client::executor::request_url;
use nfbench_client::{BenchmarkResult, DiscoveryClient, Executor, Requester};
use nfbench_openapi::{SETTINGS_HEADER, SpecSet, settings_template};
use nfbench_types::{Catalog, SettingsFile, UserInputs};
use yansi::Paint;

use crate::assemble;
use crate::config::Config;
use crate::report;

/// Options of a benchmark run.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// The target NF type, matched case-insensitively.
    pub target: String,
    /// The API name in the catalog.
    pub api: String,
    /// Number of requests to send.
    pub iterations: u64,
    /// Base URL of the target NF. Skips discovery if set.
    pub url: Option<String>,
}

/// Treats `all` like no filter.
fn nf_filter(nf: Option<&str>) -> Option<&str> {
    nf.filter(|nf| !nf.eq_ignore_ascii_case("all"))
}

fn load_specs(config: &Config) -> Result<SpecSet> {
    let specs = SpecSet::load_dir(&config.openapi_dir)?;
    if specs.is_empty() {
        bail!(
            "no OpenAPI documents found in {}, add the YAML specifications there",
            config.openapi_dir.display()
        );
    }
    Ok(specs)
}

/// Loads the persisted catalog, or builds one from the OpenAPI directory if there is none yet.
pub fn load_catalog(config: &Config) -> Result<Catalog> {
    if config.catalog_path.exists() {
        return Catalog::load(&config.catalog_path)
            .with_context(|| format!("failed to load {}", config.catalog_path.display()));
    }

    tracing::debug!(
        path = %config.catalog_path.display(),
        "no catalog file, reading OpenAPI documents"
    );
    Ok(load_specs(config)?.catalog(None))
}

/// Lists all NFs, or the APIs of one NF.
pub fn list(config: &Config, nf: Option<&str>) -> Result<()> {
    let catalog = load_catalog(config)?;
    let mut stdout = io::stdout().lock();

    match nf_filter(nf) {
        Some(nf) => report::write_apis(&mut stdout, &catalog, nf)?,
        None => report::write_nfs(&mut stdout, &catalog)?,
    }

    Ok(())
}

/// Regenerates the catalog and the settings template, optionally for a single NF.
///
/// Returns the generated catalog.
pub fn build(config: &Config, nf: Option<&str>) -> Result<Catalog> {
    let filter = nf_filter(nf);
    let specs = load_specs(config)?;

    let catalog = specs.catalog(filter);
    if catalog.is_empty() {
        bail!("no APIs found for NF {}", filter.unwrap_or("all"));
    }

    catalog
        .save(&config.catalog_path)
        .with_context(|| format!("failed to write {}", config.catalog_path.display()))?;
    tracing::info!(path = %config.catalog_path.display(), "API catalog written");

    settings_template(&specs, filter)
        .save(&config.settings_path, SETTINGS_HEADER)
        .with_context(|| format!("failed to write {}", config.settings_path.display()))?;
    tracing::info!(path = %config.settings_path.display(), "settings file written");

    println!(
        "{} Fill in the values in {} before running APIs.",
        "Done.".bold().green(),
        config.settings_path.display()
    );
    Ok(catalog)
}

async fn discover(config: &Config, inputs: &UserInputs, nf: &str) -> Result<String> {
    let settings = &inputs.global_settings;
    let nrf_url = settings
        .nrf_url()
        .context("nrf_url is not set in the global settings")?;
    let requester = Requester {
        nf_type: settings.requester_nf_type(),
        instance_id: settings.requester_nf_instance_id(),
    };

    let client = DiscoveryClient::new(&nrf_url, config.discovery_timeout)?;
    let url = client
        .discover(nf, &requester)
        .await
        .with_context(|| format!("failed to discover {nf} through the NRF at {nrf_url}"))?;
    Ok(url)
}

/// Assembles the request, discovers the target, and runs the benchmark.
pub async fn run(config: &Config, options: &RunOptions) -> Result<BenchmarkResult> {
    if options.iterations == 0 {
        bail!("the number of iterations must be at least 1");
    }

    let catalog = Catalog::load(&config.catalog_path).with_context(|| {
        format!(
            "failed to load {}, run `nfbench build` first",
            config.catalog_path.display()
        )
    })?;
    let inputs = SettingsFile::load(&config.settings_path)
        .with_context(|| {
            format!(
                "failed to load {}, run `nfbench build` first",
                config.settings_path.display()
            )
        })?
        .user_inputs;

    let nf = options.target.to_uppercase();
    let mut plan = assemble::prepare(&nf, &options.api, &catalog, &inputs)?;

    let base_url = match &options.url {
        Some(url) => url.clone(),
        None => discover(config, &inputs, &plan.nf).await?,
    };
    plan.base_url = Some(base_url);
    let url = request_url(&plan)?;

    if let Some(retries) = inputs.global_settings.retry_count() {
        tracing::debug!(retries, "retry_count is set but requests are never retried");
    }
    let timeout = inputs
        .global_settings
        .timeout()
        .unwrap_or(config.request_timeout);

    report::write_plan(&mut io::stdout().lock(), &plan, url.as_str())?;

    let executor = Executor::new(timeout)?;
    let result = nfbench_client::benchmark::run(&executor, &plan, options.iterations).await;

    let mut stdout = io::stdout().lock();
    report::write_summary(&mut stdout, &result)?;
    stdout.flush()?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_no_filter() {
        assert_eq!(nf_filter(None), None);
        assert_eq!(nf_filter(Some("ALL")), None);
        assert_eq!(nf_filter(Some("ausf")), Some("ausf"));
    }
}
