//! End-to-end tests: build the catalog from OpenAPI documents, fill in the settings file, and run
//! a benchmark against in-process mock servers.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use nfbench_cli::assemble::AssembleError;
use nfbench_cli::commands::{self, RunOptions};
use nfbench_cli::config::Config;
use nfbench_test::server::TestServer;
use nfbench_types::settings::BodyTemplate;
use nfbench_types::{ConfigValue, SettingsFile};
use serde_json::{Value, json};

const AUSF: &str = r#"
openapi: 3.0.0
info:
  title: AUSF API
  description: AUSF UE Authentication Service.
  version: 1.3.0
servers:
  - url: '{apiRoot}/nausf-auth/v1'
paths:
  /ue-authentications:
    post:
      operationId: UeAuthenticationsPost
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/AuthenticationInfo'
  /ue-authentications/{authCtxId}/5g-aka-confirmation:
    delete:
      operationId: Delete5gAkaAuthenticationResult
components:
  schemas:
    AuthenticationInfo:
      type: object
      required: [supiOrSuci, servingNetworkName]
      properties:
        supiOrSuci:
          type: string
        servingNetworkName:
          type: string
"#;

fn config(dir: &Path) -> Config {
    let openapi_dir = dir.join("openapi");
    fs::create_dir_all(&openapi_dir).unwrap();
    fs::write(openapi_dir.join("TS29509_Nausf_UEAuthentication.yaml"), AUSF).unwrap();

    Config {
        catalog_path: openapi_dir.join("api_list.yaml"),
        openapi_dir,
        settings_path: dir.join("configuration.yaml"),
        ..Default::default()
    }
}

fn fill_settings(config: &Config, nrf_url: &str) -> Result<()> {
    let mut settings = SettingsFile::load(&config.settings_path)?;
    let inputs = &mut settings.user_inputs;

    inputs.global_settings.nrf_url = Some(ConfigValue::Bare(Value::from(nrf_url)));
    inputs.global_settings.requester_nf_type = Some(ConfigValue::Bare(Value::from("AF")));

    let mut body = BodyTemplate::default();
    body.properties.insert(
        "supiOrSuci".into(),
        ConfigValue::Bare(json!("imsi-208930000000001")),
    );
    body.properties.insert(
        "servingNetworkName".into(),
        ConfigValue::Bare(json!("5G:mnc093.mcc208.3gppnetwork.org")),
    );
    inputs
        .api_specific_request_bodies
        .insert("AuthenticationInfo".into(), body);

    settings.save(&config.settings_path, "")?;
    Ok(())
}

async fn authenticate(Json(body): Json<Value>) -> StatusCode {
    if body["supiOrSuci"] == "imsi-208930000000001" {
        StatusCode::CREATED
    } else {
        StatusCode::BAD_REQUEST
    }
}

#[tokio::test]
async fn test_build_and_run_with_url() -> Result<()> {
    nfbench_test::tracing::init();
    let dir = tempfile::tempdir()?;
    let config = config(dir.path());

    let catalog = commands::build(&config, Some("AUSF"))?;
    assert!(catalog.lookup("AUSF", "UeAuthenticationsPost").is_ok());
    assert!(config.catalog_path.exists());
    assert!(config.settings_path.exists());

    let router = Router::new().route("/nausf-auth/v1/ue-authentications", post(authenticate));
    let server = TestServer::new(router).await;
    fill_settings(&config, "http://127.0.0.1:9")?;

    let options = RunOptions {
        target: "ausf".into(),
        api: "UeAuthenticationsPost".into(),
        iterations: 3,
        url: Some(server.base_url()),
    };
    let result = commands::run(&config, &options).await?;
    assert_eq!(result.total, 3);
    assert_eq!(result.success, 3);
    assert_eq!(result.failure, 0);

    Ok(())
}

#[tokio::test]
async fn test_run_with_discovery() -> Result<()> {
    nfbench_test::tracing::init();
    let dir = tempfile::tempdir()?;
    let config = config(dir.path());
    commands::build(&config, None)?;

    let ausf_router =
        Router::new().route("/nausf-auth/v1/ue-authentications", post(authenticate));
    let ausf = TestServer::new(ausf_router).await;

    let port = ausf.port();
    let nrf_router = Router::new().route(
        "/nnrf-disc/v1/nf-instances",
        get(move |Query(query): Query<HashMap<String, String>>| async move {
            let instances = match query.get("target-nf-type").map(String::as_str) {
                Some("AUSF") => json!([{
                    "nfInstanceId": "ausf-1",
                    "nfType": "AUSF",
                    "nfStatus": "REGISTERED",
                    "nfServices": [{
                        "serviceInstanceId": "0",
                        "serviceName": "nausf-auth",
                        "ipEndPoints": [{"ipv4Address": "127.0.0.1", "port": port}]
                    }]
                }]),
                _ => json!([]),
            };
            Json(json!({ "nfInstances": instances }))
        }),
    );
    let nrf = TestServer::new(nrf_router).await;
    fill_settings(&config, &nrf.base_url())?;

    let options = RunOptions {
        target: "ausf".into(),
        api: "UeAuthenticationsPost".into(),
        iterations: 2,
        url: None,
    };
    let result = commands::run(&config, &options).await?;
    assert_eq!(result.total, 2);
    assert_eq!(result.success, 2);

    Ok(())
}

/// A server that answers every request with `200 OK` and counts them.
async fn counting_server() -> (TestServer, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().fallback(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            StatusCode::OK
        }
    });
    (TestServer::new(router).await, hits)
}

#[tokio::test]
async fn test_missing_inputs_send_no_requests() -> Result<()> {
    nfbench_test::tracing::init();
    let dir = tempfile::tempdir()?;
    let config = config(dir.path());
    commands::build(&config, None)?;
    let (server, hits) = counting_server().await;

    // The body fields are still empty in the generated settings.
    let options = RunOptions {
        target: "AUSF".into(),
        api: "UeAuthenticationsPost".into(),
        iterations: 3,
        url: Some(server.base_url()),
    };
    let err = commands::run(&config, &options).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AssembleError>(),
        Some(AssembleError::MissingBodyField { field, .. }) if field == "supiOrSuci"
    ));

    // The NRF is the counting server as well, so discovery would be seen.
    fill_settings(&config, &server.base_url())?;
    let options = RunOptions {
        target: "AUSF".into(),
        api: "Delete5gAkaAuthenticationResult".into(),
        iterations: 3,
        url: None,
    };
    let err = commands::run(&config, &options).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AssembleError>(),
        Some(AssembleError::MissingParameter { name, .. }) if name == "authCtxId"
    ));
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let options = RunOptions {
        target: "AUSF".into(),
        api: "UeAuthenticationsPost".into(),
        iterations: 1,
        url: Some(server.base_url()),
    };
    let result = commands::run(&config, &options).await?;
    assert_eq!(result.success, 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_build_unknown_nf() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = config(dir.path());

    let err = commands::build(&config, Some("SMF")).unwrap_err();
    assert_eq!(err.to_string(), "no APIs found for NF SMF");
    assert!(!config.catalog_path.exists());

    Ok(())
}
