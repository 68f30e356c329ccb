//! Turns a catalog operation and the user settings into an [`ExecutionPlan`].
//!
//! Plans are validated completely before any network call: a required parameter or required body
//! field without a value aborts with an error that names it.

use nfbench_types::catalog::LookupError;
use nfbench_types::plan::{JSON_CONTENT_TYPE, ParamValue};
use nfbench_types::{Catalog, ExecutionPlan, UserInputs};
use serde_json::{Map, Value, json};

/// Errors assembling a request.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// The NF or the API is not in the catalog.
    #[error(transparent)]
    NotFound(#[from] LookupError),
    /// A required parameter has no value in the settings file.
    #[error("required parameter '{name}' of {api} is empty, fill in its value in the settings file")]
    MissingParameter {
        /// The API being assembled.
        api: String,
        /// The parameter name.
        name: String,
    },
    /// A required request body field has no value in the settings file.
    #[error(
        "required field '{field}' of request body '{schema}' for {api} is empty, fill in its value in the settings file"
    )]
    MissingBodyField {
        /// The API being assembled.
        api: String,
        /// The request body schema name.
        schema: String,
        /// The field name.
        field: String,
    },
}

/// Builds the execution plan for `api_name` of `nf`.
///
/// Parameter values are taken from the API-specific parameters first, then from the common ones.
/// Optional parameters without a value stay in the plan with an empty value and are left out of
/// the request. If the request body declares required fields, exactly those are sent. Otherwise a
/// default body is chosen by the request body type.
///
/// The base URL is left unset, discovery fills it in.
pub fn prepare(
    nf: &str,
    api_name: &str,
    catalog: &Catalog,
    inputs: &UserInputs,
) -> Result<ExecutionPlan, AssembleError> {
    let found = catalog.lookup(nf, api_name)?;
    let api = found.api;

    if inputs.nf(found.nf).is_some_and(|settings| !settings.is_enabled()) {
        tracing::warn!(nf = found.nf, "NF is disabled in the settings file, executing anyway");
    }

    let mut plan = ExecutionPlan::new(
        found.nf,
        api_name,
        api.method,
        &found.service.path,
        &api.path,
    );

    for param in &api.parameters {
        let value = inputs.parameter(&param.name).unwrap_or_default();
        if param.required && value.is_empty() {
            return Err(AssembleError::MissingParameter {
                api: api_name.to_owned(),
                name: param.name.clone(),
            });
        }
        tracing::trace!(name = %param.name, %value, "resolved parameter");
        plan.parameters.push(ParamValue {
            name: param.name.clone(),
            value,
        });
    }

    let descriptor = &api.request_body_schema;
    plan.body = if !descriptor.required_fields.is_empty() {
        let schema = descriptor
            .schema_name
            .as_deref()
            .or(api.request_body.as_deref())
            .unwrap_or_default();

        let mut body = Map::new();
        for field in &descriptor.required_fields {
            let value = inputs.body_field(schema, field).ok_or_else(|| {
                AssembleError::MissingBodyField {
                    api: api_name.to_owned(),
                    schema: schema.to_owned(),
                    field: field.clone(),
                }
            })?;
            body.insert(field.clone(), value);
        }
        Some(Value::Object(body))
    } else {
        api.request_body
            .as_deref()
            .filter(|ty| !ty.is_empty())
            .map(|ty| {
                tracing::debug!(body_type = ty, "using default request body");
                default_body(ty)
            })
    };

    plan.set_header("Content-Type", JSON_CONTENT_TYPE);
    plan.set_header("Accept", JSON_CONTENT_TYPE);
    for (name, value) in inputs.custom_headers(found.nf) {
        plan.set_header(name, value);
    }

    Ok(plan)
}

/// Returns the built-in request body for a body type.
///
/// Unknown types get a minimal generic object.
pub fn default_body(body_type: &str) -> Value {
    match body_type {
        "AuthenticationInfo" => json!({
            "servingNetworkName": "5G:mnc093.mcc208.3gppnetwork.org",
            "resynchronizationInfo": {
                "rand": "00112233445566778899aabbccddeeff",
                "auts": "fedcba9876543210",
            },
            "supportedFeatures": "example-features",
        }),
        "subscription_data" => json!({
            "callbackReference": "http://callback.example.com/notifications",
            "monitoringConfigurations": {
                "eventType": "LOCATION_REPORTING",
                "immediateFlag": true,
            },
            "supportedFeatures": "example-features",
        }),
        "pdu_session_info" => json!({
            "pduSessionType": "IPV4",
            "sscMode": "SSC_MODE_1",
            "dnn": "internet",
            "snssai": {"sst": 1, "sd": "123456"},
        }),
        "nf_profile" => json!({
            "nfInstanceId": "example-nf-instance-id",
            "nfType": "AUSF",
            "nfStatus": "REGISTERED",
            "ipv4Addresses": ["192.168.1.100"],
        }),
        "patch_request" => json!([
            {"op": "replace", "path": "/nfStatus", "value": "REGISTERED"},
        ]),
        _ => json!({
            "data": "example-data",
            "supportedFeatures": "example-features",
        }),
    }
}

#[cfg(test)]
mod tests {
    use nfbench_types::{Method, SettingsFile};

    use super::*;

    const CATALOG: &str = r#"
AUSF:
  UEAuthentication:
    path: /nausf-auth/v1
    version: v1
    apis:
      UeAuthenticationsPost:
        path: /ue-authentications
        method: POST
        request_body: AuthenticationInfo
        request_body_schema:
          schema_name: AuthenticationInfo
          required_fields: [supiOrSuci, servingNetworkName]
      UeAuthenticationsDeregisterPost:
        path: /ue-authentications/deregister
        method: POST
        request_body: DeregistrationInfo
      Delete5gAkaAuthenticationResult:
        path: /ue-authentications/{authCtxId}/5g-aka-confirmation
        method: DELETE
        parameters:
          - name: authCtxId
            required: true
            type: string
            in: path
UDM:
  Nudm_SDM:
    path: /nudm-sdm/v2
    version: v2
    apis:
      GetAmData:
        path: /{supi}/am-data
        method: GET
        parameters:
          - name: supi
            required: true
            in: path
          - name: supported-features
            required: false
            in: query
          - name: plmn-id
            required: false
            in: query
"#;

    const SETTINGS: &str = r#"
user_inputs:
  global_settings:
    nrf_url: http://nrf:8000
  nf_settings:
    UDM:
      enabled:
        value: false
      custom_headers:
        accept:
          value: application/problem+json
        X-Trace-Id: abc
  common_parameters:
    supi:
      value: imsi-208930000000001
    supported-features:
      value: ""
    authCtxId:
      value: ""
  api_specific_parameters:
    plmn-id:
      value: "20893"
  common_request_bodies:
    AuthenticationInfo:
      properties:
        supiOrSuci:
          value: suci-0-208-93-0000-0-0-0000000001
        servingNetworkName:
          value: ""
  api_specific_request_bodies:
    AuthenticationInfo:
      properties:
        servingNetworkName: 5G:mnc093.mcc208.3gppnetwork.org
        resynchronizationInfo:
          value:
            rand: "00"
"#;

    fn fixtures() -> (Catalog, UserInputs) {
        let catalog = Catalog::from_yaml(CATALOG).unwrap();
        let settings = SettingsFile::from_yaml(SETTINGS).unwrap();
        (catalog, settings.user_inputs)
    }

    #[test]
    fn resolves_parameters_and_headers() {
        let (catalog, inputs) = fixtures();
        let plan = prepare("udm", "GetAmData", &catalog, &inputs).unwrap();

        assert_eq!(plan.nf, "UDM");
        assert_eq!(plan.method, Method::Get);
        assert_eq!(plan.service_path, "/nudm-sdm/v2");
        assert_eq!(plan.resolved_path(), "/imsi-208930000000001/am-data");
        assert_eq!(plan.base_url, None);
        assert_eq!(plan.body, None);

        let values: Vec<_> = plan
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect();
        assert_eq!(
            values,
            [
                ("supi", "imsi-208930000000001"),
                ("supported-features", ""),
                ("plmn-id", "20893"),
            ]
        );
        let query: Vec<_> = plan.query_parameters().map(|p| p.name.as_str()).collect();
        assert_eq!(query, ["plmn-id"]);

        assert_eq!(plan.headers.len(), 3);
        assert_eq!(plan.headers["Content-Type"], "application/json");
        assert_eq!(plan.headers["accept"], "application/problem+json");
        assert_eq!(plan.headers["X-Trace-Id"], "abc");
    }

    #[test]
    fn missing_required_parameter() {
        let (catalog, inputs) = fixtures();
        let err = prepare("AUSF", "Delete5gAkaAuthenticationResult", &catalog, &inputs)
            .unwrap_err();
        assert!(matches!(
            err,
            AssembleError::MissingParameter { name, .. } if name == "authCtxId"
        ));
    }

    #[test]
    fn body_contains_required_fields_only() {
        let (catalog, inputs) = fixtures();
        let plan = prepare("AUSF", "UeAuthenticationsPost", &catalog, &inputs).unwrap();

        assert_eq!(
            plan.body,
            Some(json!({
                "supiOrSuci": "suci-0-208-93-0000-0-0-0000000001",
                "servingNetworkName": "5G:mnc093.mcc208.3gppnetwork.org",
            }))
        );
        assert_eq!(plan.headers["Accept"], "application/json");
    }

    #[test]
    fn missing_required_body_field() {
        let (catalog, mut inputs) = fixtures();
        inputs.api_specific_request_bodies.clear();

        let err = prepare("AUSF", "UeAuthenticationsPost", &catalog, &inputs).unwrap_err();
        match err {
            AssembleError::MissingBodyField { schema, field, .. } => {
                assert_eq!(schema, "AuthenticationInfo");
                assert_eq!(field, "servingNetworkName");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_body_by_type() {
        let (catalog, inputs) = fixtures();
        let plan = prepare("AUSF", "UeAuthenticationsDeregisterPost", &catalog, &inputs).unwrap();
        assert_eq!(
            plan.body,
            Some(json!({"data": "example-data", "supportedFeatures": "example-features"}))
        );

        assert!(default_body("patch_request").is_array());
        assert_eq!(
            default_body("pdu_session_info")["snssai"],
            json!({"sst": 1, "sd": "123456"})
        );
    }

    #[test]
    fn unknown_operations() {
        let (catalog, inputs) = fixtures();

        let err = prepare("SMF", "Anything", &catalog, &inputs).unwrap_err();
        assert!(matches!(
            err,
            AssembleError::NotFound(LookupError::UnknownNf(nf)) if nf == "SMF"
        ));

        let err = prepare("AUSF", "GetAmData", &catalog, &inputs).unwrap_err();
        assert!(matches!(
            err,
            AssembleError::NotFound(LookupError::UnknownApi { .. })
        ));
    }
}
