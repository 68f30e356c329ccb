//! Configuration of the nfbench tool itself.
//!
//! This is separate from the settings file (`configuration.yaml`) that holds the values sent to
//! NFs. Tool configuration only covers where files live, timeouts and logging. It is loaded with
//! the following precedence (highest to lowest):
//!
//! 1. Environment variables (prefixed with `NFBENCH__`)
//! 2. YAML configuration file (specified via `-c` or `--config` flag)
//! 3. Defaults
//!
//! # Environment Variables
//!
//! Double underscores (`__`) denote nested structures, for example:
//!
//! - `NFBENCH__OPENAPI_DIR=/specs` sets the directory with OpenAPI documents
//! - `NFBENCH__REQUEST_TIMEOUT=5s` sets the request timeout
//! - `NFBENCH__LOGGING__LEVEL=debug` sets the log level
//!
//! # YAML Configuration File
//!
//! ```yaml
//! openapi_dir: /specs
//! request_timeout: 5s
//! logging:
//!   level: debug
//!   format: json
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use figment::providers::{Env, Format, Serialized, Yaml};
use nfbench_client::discovery::DEFAULT_DISCOVERY_TIMEOUT;
use nfbench_client::executor::DEFAULT_REQUEST_TIMEOUT;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

/// Environment variable prefix for all configuration options.
const ENV_PREFIX: &str = "NFBENCH__";

/// Log output format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Auto detect the best format.
    ///
    /// This chooses [`LogFormat::Pretty`] for TTY, otherwise [`LogFormat::Simplified`].
    Auto,

    /// Pretty printing with colors.
    Pretty,

    /// Simplified plain text output.
    ///
    /// ```text
    /// 2025-01-01T12:10:32Z  INFO nfbench_client::discovery: discovered NF
    /// ```
    Simplified,

    /// Dump out JSON lines.
    Json,
}

mod display_fromstr {
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
        T: std::fmt::Display,
    {
        serializer.collect_str(&value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: std::str::FromStr,
        <T as std::str::FromStr>::Err: std::fmt::Display,
    {
        use serde::Deserialize;
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Logging configuration.
///
/// Logs are always written to stderr, so they never mix with listings and reports on stdout.
#[derive(Debug, Deserialize, Serialize)]
pub struct Logging {
    /// Minimum log level to output.
    ///
    /// Valid levels in increasing severity: TRACE, DEBUG, INFO, WARN, ERROR, OFF. The `RUST_LOG`
    /// environment variable provides more granular control per module if needed.
    ///
    /// # Default
    ///
    /// `INFO`
    ///
    /// # Environment Variable
    ///
    /// `NFBENCH__LOGGING__LEVEL`
    #[serde(with = "display_fromstr")]
    pub level: LevelFilter,

    /// Log output format. See [`LogFormat`] for available options.
    ///
    /// # Default
    ///
    /// `Auto` (pretty for TTY, simplified otherwise)
    ///
    /// # Environment Variable
    ///
    /// `NFBENCH__LOGGING__FORMAT`
    pub format: LogFormat,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Auto,
        }
    }
}

/// Main configuration struct for nfbench.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for OpenAPI documents by `build` and `list`.
    ///
    /// # Default
    ///
    /// `openapi`
    pub openapi_dir: PathBuf,

    /// Location of the generated API catalog.
    ///
    /// # Default
    ///
    /// `openapi/api_list.yaml`
    pub catalog_path: PathBuf,

    /// Location of the user-edited settings file.
    ///
    /// # Default
    ///
    /// `configuration.yaml`
    pub settings_path: PathBuf,

    /// Timeout of the NRF discovery request.
    ///
    /// # Default
    ///
    /// `10s`
    #[serde(with = "humantime_serde")]
    pub discovery_timeout: Duration,

    /// Timeout of each API request.
    ///
    /// The `timeout_seconds` global setting in the settings file takes precedence.
    ///
    /// # Default
    ///
    /// `30s`
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Logging configuration.
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openapi_dir: PathBuf::from("openapi"),
            catalog_path: PathBuf::from("openapi/api_list.yaml"),
            settings_path: PathBuf::from("configuration.yaml"),
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            logging: Logging::default(),
        }
    }
}

impl Config {
    /// Loads configuration from defaults, an optional YAML file, and the environment.
    ///
    /// Later sources override earlier ones.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = figment::Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}
