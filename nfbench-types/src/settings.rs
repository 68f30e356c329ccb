//! The user-edited settings file.
//!
//! `nfbench build` generates `configuration.yaml` with empty placeholders, which users fill in
//! before executing APIs. Every leaf may either be a bare scalar or a wrapper object that carries
//! documentation next to the value:
//!
//! ```yaml
//! user_inputs:
//!   global_settings:
//!     nrf_url:
//!       value: http://nrf.example:8000
//!       description: NRF server URL
//!       required: true
//!   common_parameters:
//!     authCtxId: 7f3c...          # bare values are accepted as well
//! ```
//!
//! Only `value` is consumed at execution time, see [`ConfigValue`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors reading or writing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid YAML or does not match the settings structure.
    #[error("failed to parse settings file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A documented configuration value with annotations for the user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// The configured value. Empty strings and `null` count as unset.
    pub value: Value,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared type, for reference.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// Whether execution requires this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Example value, for reference only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Allowed values, for reference only.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    /// Declared format, for reference only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Field {
    /// Creates an annotated field with the given value.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    /// Attaches a description.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A leaf value in the settings file.
///
/// Both a bare value and a `{value: ...}` wrapper are accepted. An object is only treated as a
/// wrapper if it has a `value` key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// A `{value: ..., description: ...}` object.
    Wrapped(Field),
    /// A plain scalar, list, or object.
    Bare(Value),
}

impl ConfigValue {
    /// Returns the configured value, or `None` if it is unset.
    ///
    /// `null` and the empty string count as unset.
    pub fn value(&self) -> Option<&Value> {
        let value = match self {
            ConfigValue::Wrapped(field) => &field.value,
            ConfigValue::Bare(value) => value,
        };
        match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            value => Some(value),
        }
    }

    /// Returns the configured value rendered as text.
    ///
    /// Strings are returned verbatim, other values in their JSON representation.
    pub fn text(&self) -> Option<String> {
        self.value().map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Returns the configured value as an integer, accepting numeric strings.
    pub fn as_u64(&self) -> Option<u64> {
        match self.value()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the configured value as a boolean, accepting `"true"` and `"false"`.
    pub fn as_bool(&self) -> Option<bool> {
        match self.value()? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<Field> for ConfigValue {
    fn from(field: Field) -> Self {
        ConfigValue::Wrapped(field)
    }
}

/// Global settings, used for discovery and the HTTP client.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    /// Base URL of the NRF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nrf_url: Option<ConfigValue>,
    /// NF type reported to the NRF as the requester.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_nf_type: Option<ConfigValue>,
    /// NF instance ID reported to the NRF as the requester.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_nf_instance_id: Option<ConfigValue>,
    /// Per-request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<ConfigValue>,
    /// Number of retries. Accepted for compatibility, requests are never retried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<ConfigValue>,
    /// Any other settings, preserved but unused.
    #[serde(flatten)]
    pub other: BTreeMap<String, ConfigValue>,
}

impl GlobalSettings {
    /// The configured NRF URL.
    pub fn nrf_url(&self) -> Option<String> {
        self.nrf_url.as_ref().and_then(ConfigValue::text)
    }

    /// The configured requester NF type.
    pub fn requester_nf_type(&self) -> Option<String> {
        self.requester_nf_type.as_ref().and_then(ConfigValue::text)
    }

    /// The configured requester NF instance ID.
    pub fn requester_nf_instance_id(&self) -> Option<String> {
        self.requester_nf_instance_id
            .as_ref()
            .and_then(ConfigValue::text)
    }

    /// The configured per-request timeout. Zero counts as unset.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds
            .as_ref()
            .and_then(ConfigValue::as_u64)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// The configured retry count.
    pub fn retry_count(&self) -> Option<u64> {
        self.retry_count.as_ref().and_then(ConfigValue::as_u64)
    }
}

/// Settings for a single NF.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfSettings {
    /// Whether the NF is enabled. Defaults to `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<ConfigValue>,
    /// Extra headers sent with every request to this NF.
    pub custom_headers: BTreeMap<String, ConfigValue>,
}

impl NfSettings {
    /// Returns whether the NF is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
            .as_ref()
            .and_then(ConfigValue::as_bool)
            .unwrap_or(true)
    }
}

/// Field values for one request body schema.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyTemplate {
    /// Name of the schema this template fills in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// Human readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared type of the schema.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// Fields the schema requires, for reference.
    #[serde(alias = "required", skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    /// Field values by property name.
    pub properties: BTreeMap<String, ConfigValue>,
}

/// The `user_inputs` section of the settings file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInputs {
    /// Discovery and client settings.
    pub global_settings: GlobalSettings,
    /// Per-NF settings, by NF name.
    pub nf_settings: BTreeMap<String, NfSettings>,
    /// Parameter values shared by many APIs.
    pub common_parameters: BTreeMap<String, ConfigValue>,
    /// Parameter values for individual APIs. These take precedence over common values.
    pub api_specific_parameters: BTreeMap<String, ConfigValue>,
    /// Request body field values shared by many APIs, by schema name.
    pub common_request_bodies: BTreeMap<String, BodyTemplate>,
    /// Request body field values for individual APIs, by schema name. These take precedence over
    /// common values.
    pub api_specific_request_bodies: BTreeMap<String, BodyTemplate>,
}

impl UserInputs {
    /// Resolves a parameter value.
    ///
    /// API-specific entries are checked first, then common entries. Unset entries fall through.
    pub fn parameter(&self, name: &str) -> Option<String> {
        [&self.api_specific_parameters, &self.common_parameters]
            .into_iter()
            .find_map(|params| params.get(name).and_then(ConfigValue::text))
    }

    /// Resolves a request body field of the given schema.
    ///
    /// API-specific request bodies are checked first, then common ones. Unset entries fall
    /// through.
    pub fn body_field(&self, schema: &str, field: &str) -> Option<Value> {
        [&self.api_specific_request_bodies, &self.common_request_bodies]
            .into_iter()
            .find_map(|bodies| {
                bodies
                    .get(schema)?
                    .properties
                    .get(field)
                    .and_then(ConfigValue::value)
                    .cloned()
            })
    }

    /// Returns the settings of an NF, matching the name case-insensitively.
    pub fn nf(&self, nf: &str) -> Option<&NfSettings> {
        self.nf_settings
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(nf))
            .map(|(_, settings)| settings)
    }

    /// Returns the configured custom headers of an NF with their values.
    ///
    /// Headers without a value are skipped.
    pub fn custom_headers(&self, nf: &str) -> Vec<(String, String)> {
        let Some(settings) = self.nf(nf) else {
            return Vec::new();
        };
        settings
            .custom_headers
            .iter()
            .filter_map(|(name, value)| Some((name.clone(), value.text()?)))
            .collect()
    }
}

/// The settings file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsFile {
    /// All user-provided inputs.
    #[serde(default)]
    pub user_inputs: UserInputs,
}

impl SettingsFile {
    /// Parses the settings file from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, SettingsError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads the settings file from disk.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Writes the settings file to disk, prefixed with a comment header.
    pub fn save(&self, path: &Path, header: &str) -> Result<(), SettingsError> {
        let body = serde_yaml::to_string(self)?;
        fs::write(path, format!("{header}{body}"))?;
        tracing::debug!(path = %path.display(), "wrote settings file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: &str = r#"
user_inputs:
  global_settings:
    nrf_url:
      value: http://nrf:8000
      description: NRF server URL
      required: true
    requester_nf_type: AMF
    timeout_seconds:
      value: 5
      type: integer
    retry_count:
      value: 3
    use_https:
      value: false
  nf_settings:
    AUSF:
      enabled:
        value: true
      custom_headers:
        X-Trace:
          value: bench
        Accept: application/problem+json
        X-Empty:
          value: ""
  common_parameters:
    authCtxId:
      value: common-ctx
    supi: imsi-208930000000001
    empty:
      value: ""
  api_specific_parameters:
    authCtxId:
      value: specific-ctx
    empty-specific:
      value: ""
    supi: ""
  common_request_bodies:
    AuthenticationInfo:
      schema_name: AuthenticationInfo
      required: [supiOrSuci, servingNetworkName]
      properties:
        supiOrSuci:
          value: suci-0-208-93-0000-0-0-0000000001
        servingNetworkName:
          value: common-network
  api_specific_request_bodies:
    AuthenticationInfo:
      properties:
        servingNetworkName:
          value: 5G:mnc093.mcc208.3gppnetwork.org
        resynchronizationInfo:
          value: ""
"#;

    #[test]
    fn parses_both_value_shapes() {
        let settings = SettingsFile::from_yaml(SETTINGS).unwrap().user_inputs;
        let global = &settings.global_settings;

        assert_eq!(global.nrf_url().as_deref(), Some("http://nrf:8000"));
        assert_eq!(global.requester_nf_type().as_deref(), Some("AMF"));
        assert_eq!(global.requester_nf_instance_id(), None);
        assert_eq!(global.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(global.retry_count(), Some(3));
        assert!(global.other.contains_key("use_https"));
    }

    #[test]
    fn api_specific_parameters_take_precedence() {
        let settings = SettingsFile::from_yaml(SETTINGS).unwrap().user_inputs;

        assert_eq!(settings.parameter("authCtxId").as_deref(), Some("specific-ctx"));
        // an empty API-specific value falls through to the common one
        assert_eq!(
            settings.parameter("supi").as_deref(),
            Some("imsi-208930000000001")
        );
        assert_eq!(settings.parameter("empty"), None);
        assert_eq!(settings.parameter("empty-specific"), None);
        assert_eq!(settings.parameter("missing"), None);
    }

    #[test]
    fn body_fields_resolve_by_schema() {
        let settings = SettingsFile::from_yaml(SETTINGS).unwrap().user_inputs;

        assert_eq!(
            settings.body_field("AuthenticationInfo", "servingNetworkName"),
            Some(Value::from("5G:mnc093.mcc208.3gppnetwork.org"))
        );
        assert_eq!(
            settings.body_field("AuthenticationInfo", "supiOrSuci"),
            Some(Value::from("suci-0-208-93-0000-0-0-0000000001"))
        );
        assert_eq!(
            settings.body_field("AuthenticationInfo", "resynchronizationInfo"),
            None
        );
        assert_eq!(settings.body_field("Other", "supiOrSuci"), None);
        assert_eq!(
            settings.common_request_bodies["AuthenticationInfo"].required_fields,
            ["supiOrSuci", "servingNetworkName"]
        );
    }

    #[test]
    fn custom_headers_skip_unset_values() {
        let settings = SettingsFile::from_yaml(SETTINGS).unwrap().user_inputs;
        let headers = settings.custom_headers("ausf");

        assert_eq!(
            headers,
            vec![
                ("Accept".to_owned(), "application/problem+json".to_owned()),
                ("X-Trace".to_owned(), "bench".to_owned()),
            ]
        );
        assert!(settings.custom_headers("UDM").is_empty());
        assert!(settings.nf("AUSF").unwrap().is_enabled());
    }

    #[test]
    fn bare_objects_are_values() {
        let value: ConfigValue = serde_yaml::from_str("{sst: 1, sd: '010203'}").unwrap();
        assert_eq!(value.value(), Some(&serde_json::json!({"sst": 1, "sd": "010203"})));

        let wrapped: ConfigValue = serde_yaml::from_str("{value: 42, type: integer}").unwrap();
        assert_eq!(wrapped.text().as_deref(), Some("42"));
        assert_eq!(wrapped.as_u64(), Some(42));
    }

    #[test]
    fn saved_file_reloads() {
        let settings = SettingsFile::from_yaml(SETTINGS).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configuration.yaml");

        settings.save(&path, "# header\n").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# header\n"));
        assert_eq!(SettingsFile::load(&path).unwrap(), settings);
    }
}
