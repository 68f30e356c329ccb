//! Generation of the user settings template.
//!
//! The template lists every parameter and request body schema found in the loaded documents with an
//! empty `value` for the user to fill in. Annotations such as `description`, `type` and `example`
//! are informational only.

use std::collections::BTreeMap;

use nfbench_types::catalog::UNKNOWN_NF;
use nfbench_types::plan::JSON_CONTENT_TYPE;
use nfbench_types::settings::{BodyTemplate, Field, GlobalSettings, NfSettings};
use nfbench_types::{ConfigValue, SettingsFile, UserInputs};
use serde_json::{Value, json};

use crate::document::{Parameter, Schema, ref_name};
use crate::example::example_value;
use crate::parse::SpecSet;

/// Comment block written above the generated settings file.
pub const SETTINGS_HEADER: &str = "\
# =============================================================================
# nfbench settings
# =============================================================================
# Settings for benchmarking 5G Core Network Function APIs.
#
#   1. set the NRF URL and requester identity in global_settings
#   2. enable or disable NFs and set custom headers in nf_settings
#   3. fill in parameter values in common_parameters / api_specific_parameters
#   4. fill in request body fields in common_request_bodies / api_specific_request_bodies
#
# Only `value` fields are read. Fields marked `required: true` must be set before
# the APIs using them can run. `example` fields are for reference only.
# API-specific values take precedence over common values.
# =============================================================================

";

/// Parameter name fragments that mark a parameter as shared by many APIs.
const COMMON_PARAMETER_PATTERNS: &[&str] = &["ueid", "supi", "authctx", "session", "subscription"];

/// Schema name fragments that mark a request body as shared by many APIs.
const COMMON_BODY_PATTERNS: &[&str] = &["auth", "subscription", "session", "context"];

fn is_common_parameter(name: &str) -> bool {
    let name = name.to_lowercase();
    COMMON_PARAMETER_PATTERNS.iter().any(|p| name.contains(p))
}

fn is_common_body(schema_name: &str) -> bool {
    let name = schema_name.to_lowercase();
    COMMON_BODY_PATTERNS.iter().any(|p| name.contains(p))
}

/// Generates the settings template for all services, optionally restricted to a single NF.
pub fn settings_template(specs: &SpecSet, nf_filter: Option<&str>) -> SettingsFile {
    let mut inputs = UserInputs {
        global_settings: global_settings(),
        ..Default::default()
    };

    for service in specs.services(nf_filter) {
        if service.nf != UNKNOWN_NF {
            inputs
                .nf_settings
                .entry(service.nf.to_owned())
                .or_insert_with(|| nf_settings(service.nf));
        }

        for op in service.operations() {
            for parameter in specs.parameters(&op) {
                let section = if is_common_parameter(&parameter.name) {
                    &mut inputs.common_parameters
                } else {
                    &mut inputs.api_specific_parameters
                };
                if !section.contains_key(&parameter.name) {
                    let field = parameter_field(specs, &parameter);
                    section.insert(parameter.name.clone(), field.into());
                }
            }

            if let Some((schema_name, schema)) = specs.body_schema(op.operation) {
                let section = if is_common_body(&schema_name) {
                    &mut inputs.common_request_bodies
                } else {
                    &mut inputs.api_specific_request_bodies
                };
                if !section.contains_key(&schema_name) {
                    let template = body_template(specs, &schema_name, schema);
                    section.insert(schema_name, template);
                }
            }
        }
    }

    tracing::debug!(
        nfs = inputs.nf_settings.len(),
        parameters = inputs.common_parameters.len() + inputs.api_specific_parameters.len(),
        bodies = inputs.common_request_bodies.len() + inputs.api_specific_request_bodies.len(),
        "generated settings template"
    );

    SettingsFile {
        user_inputs: inputs,
    }
}

fn global_settings() -> GlobalSettings {
    let typed = |value: Value, ty: &str, description: &str| Field {
        ty: Some(ty.to_owned()),
        ..Field::new(value).described(description)
    };

    GlobalSettings {
        nrf_url: Some(
            Field {
                required: Some(true),
                ..Field::new("http://localhost:8000")
                    .described("NRF server URL (e.g., http://nrf-nnrf:8000)")
            }
            .into(),
        ),
        requester_nf_type: Some(
            Field {
                required: Some(true),
                ..Field::new("AF").described("Type of requesting NF (AF, AMF, SMF, etc.)")
            }
            .into(),
        ),
        requester_nf_instance_id: Some(
            Field::new("")
                .described("NF instance ID reported to the NRF, optional")
                .into(),
        ),
        timeout_seconds: Some(typed(json!(30), "integer", "HTTP request timeout in seconds").into()),
        retry_count: Some(
            typed(json!(3), "integer", "Number of retries on failure, currently unused").into(),
        ),
        other: BTreeMap::new(),
    }
}

fn nf_settings(nf: &str) -> NfSettings {
    let header = |description: &str| -> ConfigValue {
        Field::new(JSON_CONTENT_TYPE).described(description).into()
    };

    NfSettings {
        enabled: Some(
            Field {
                ty: Some("boolean".to_owned()),
                ..Field::new(true).described(format!("Enable {nf} NF"))
            }
            .into(),
        ),
        custom_headers: BTreeMap::from([
            ("Accept".to_owned(), header("Response Accept header")),
            ("Content-Type".to_owned(), header("Request Content-Type header")),
        ]),
    }
}

fn parameter_field(specs: &SpecSet, parameter: &Parameter) -> Field {
    let definitions = specs.definitions();
    let schema = parameter.schema.as_ref().map(|s| definitions.resolve(s));

    let description = parameter
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| format!("Parameter: {}", parameter.name));

    Field {
        value: Value::from(""),
        description: Some(description),
        ty: Some(
            schema
                .and_then(Schema::type_name)
                .unwrap_or("string")
                .to_owned(),
        ),
        required: Some(parameter.required),
        example: Some(match schema {
            Some(schema) => example_value(schema, definitions),
            None => json!("example-string"),
        }),
        allowed: schema
            .map(|s| s.enumeration.clone())
            .filter(|values| !values.is_empty()),
        format: schema.and_then(|s| s.format.clone()),
    }
}

fn body_template(specs: &SpecSet, schema_name: &str, schema: &Schema) -> BodyTemplate {
    let definitions = specs.definitions();
    let shape = definitions.object_shape(schema);

    let properties = shape
        .properties
        .iter()
        .map(|(name, property)| {
            let required = shape.required.contains(name);
            let field = property_field(specs, name, property, required);
            (name.clone(), ConfigValue::from(field))
        })
        .collect();

    BodyTemplate {
        schema_name: Some(schema_name.to_owned()),
        description: Some(
            schema
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| format!("Schema: {schema_name}")),
        ),
        ty: Some(schema.type_name().unwrap_or("object").to_owned()),
        required_fields: shape.required,
        properties,
    }
}

fn property_field(specs: &SpecSet, name: &str, property: &Schema, required: bool) -> Field {
    let definitions = specs.definitions();
    let resolved = definitions.resolve(property);

    let (description, ty) = match property.reference.as_deref() {
        Some(reference) => (
            resolved
                .description
                .clone()
                .unwrap_or_else(|| format!("Reference to {}", ref_name(reference))),
            resolved.type_name().unwrap_or("object"),
        ),
        None => (
            property
                .description
                .clone()
                .unwrap_or_else(|| format!("Property: {name}")),
            property.type_name().unwrap_or("string"),
        ),
    };

    Field {
        value: Value::from(""),
        description: Some(description),
        ty: Some(ty.to_owned()),
        required: Some(required),
        example: Some(example_value(property, definitions)),
        allowed: Some(resolved.enumeration.clone()).filter(|values| !values.is_empty()),
        format: resolved.format.clone(),
    }
}
