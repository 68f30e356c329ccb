//! Console output: catalog listings, execution details and the benchmark summary.

use std::io::{self, Write};

use nfbench_client::BenchmarkResult;
use nfbench_types::catalog::{ApiEntry, LookupError};
use nfbench_types::{Catalog, ExecutionPlan};
use yansi::Paint;

/// Prints all NFs with their service and API counts.
pub fn write_nfs(out: &mut impl Write, catalog: &Catalog) -> io::Result<()> {
    writeln!(out, "{}", "## Network Functions".bold())?;
    for (nf, services) in catalog.nfs() {
        let apis: usize = services.values().map(|service| service.apis.len()).sum();
        writeln!(
            out,
            "{} ({} services, {} APIs)",
            nf.bold().blue(),
            services.len(),
            apis
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Use `nfbench list <NF>` to see the APIs of a single NF.")
}

/// Prints all services and APIs of one NF.
pub fn write_apis(out: &mut impl Write, catalog: &Catalog, nf: &str) -> anyhow::Result<()> {
    let (nf, services) = catalog
        .nf(nf)
        .ok_or_else(|| LookupError::UnknownNf(nf.to_owned()))?;

    writeln!(out, "{} {}", "## APIs of".bold(), nf.bold().blue())?;
    for (name, service) in services {
        writeln!(out)?;
        writeln!(out, "{} [{}]", name.bold(), service.path)?;
        if let Some(description) = &service.description {
            writeln!(out, "  {}", description.dim())?;
        }
        for (api_name, api) in &service.apis {
            write_api(out, api_name, api)?;
        }
    }

    Ok(())
}

fn write_api(out: &mut impl Write, name: &str, api: &ApiEntry) -> io::Result<()> {
    writeln!(out, "  {} [{}]", name.green(), api.method)?;
    writeln!(out, "      path: {}", api.path)?;

    let required: Vec<_> = api
        .parameters
        .iter()
        .filter(|param| param.required)
        .map(|param| param.name.as_str())
        .collect();
    if !required.is_empty() {
        writeln!(out, "      required parameters: {}", required.join(", "))?;
    }

    if let Some(body) = &api.request_body {
        let fields = &api.request_body_schema.required_fields;
        if fields.is_empty() {
            writeln!(out, "      request body: {body}")?;
        } else {
            writeln!(out, "      request body: {body} (required: {})", fields.join(", "))?;
        }
    }

    Ok(())
}

/// Prints the resolved request before execution.
pub fn write_plan(out: &mut impl Write, plan: &ExecutionPlan, url: &str) -> io::Result<()> {
    writeln!(out, "{}", "## Execution".bold())?;
    writeln!(out, "  NF:     {}", plan.nf.bold().blue())?;
    writeln!(out, "  API:    {} [{}]", plan.api_name, plan.method)?;
    writeln!(out, "  URL:    {url}")?;

    let parameters: Vec<_> = plan
        .parameters
        .iter()
        .filter(|param| !param.value.is_empty())
        .map(|param| format!("{}={}", param.name, param.value))
        .collect();
    if !parameters.is_empty() {
        writeln!(out, "  params: {}", parameters.join(", "))?;
    }
    if let Some(body) = &plan.body {
        writeln!(out, "  body:   {body}")?;
    }

    writeln!(out)
}

/// Prints the benchmark summary.
pub fn write_summary(out: &mut impl Write, result: &BenchmarkResult) -> io::Result<()> {
    writeln!(out, "{}", "## Benchmark Results".bold())?;
    write!(out, "{} ({} requests", "TOTAL:".bold().green(), result.total.bold())?;
    if result.failure > 0 {
        write!(
            out,
            ", {}",
            format!("{} FAILURES", result.failure).bold().red()
        )?;
    }
    writeln!(out, ")")?;

    writeln!(
        out,
        "  {:.2}% success; {:.2} requests/s over {:.2?}",
        result.success_rate().bold(),
        result.throughput().bold(),
        result.elapsed
    )?;

    let (Some(min), Some(max)) = (result.min, result.max) else {
        return writeln!(out, "  {}", "no successful requests".red());
    };
    writeln!(
        out,
        "  avg: {:.2?}; min: {min:.2?}; max: {max:.2?}",
        result.average().bold()
    )?;

    if let (Some(p50), Some(p90), Some(p99)) = (
        result.percentile(0.5),
        result.percentile(0.9),
        result.percentile(0.99),
    ) {
        writeln!(out, "  p50: {p50:.2?}; p90: {p90:.2?}; p99: {p99:.2?}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use nfbench_types::Method;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_yaml(
            r#"
AUSF:
  UEAuthentication:
    path: /nausf-auth/v1
    version: v1
    description: AUSF UE Authentication Service
    apis:
      UeAuthenticationsPost:
        path: /ue-authentications
        method: POST
        request_body: AuthenticationInfo
        request_body_schema:
          schema_name: AuthenticationInfo
          required_fields: [supiOrSuci, servingNetworkName]
      Delete5gAkaAuthenticationResult:
        path: /ue-authentications/{authCtxId}/5g-aka-confirmation
        method: DELETE
        parameters:
          - name: authCtxId
            required: true
            in: path
"#,
        )
        .unwrap()
    }

    fn render(f: impl FnOnce(&mut Vec<u8>)) -> String {
        yansi::disable();
        let mut out = Vec::new();
        f(&mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn lists_nfs() {
        let output = render(|out| write_nfs(out, &catalog()).unwrap());
        assert!(output.contains("AUSF (1 services, 2 APIs)"), "{output}");
    }

    #[test]
    fn lists_apis_of_one_nf() {
        let output = render(|out| write_apis(out, &catalog(), "ausf").unwrap());

        assert!(output.contains("UEAuthentication [/nausf-auth/v1]"), "{output}");
        assert!(output.contains("AUSF UE Authentication Service"));
        assert!(output.contains("UeAuthenticationsPost [POST]"));
        assert!(output.contains("Delete5gAkaAuthenticationResult [DELETE]"));
        assert!(output.contains("required parameters: authCtxId"));
        assert!(
            output.contains("request body: AuthenticationInfo (required: supiOrSuci, servingNetworkName)")
        );
    }

    #[test]
    fn unknown_nf() {
        let mut out = Vec::new();
        let err = write_apis(&mut out, &catalog(), "SMF").unwrap_err();
        assert_eq!(err.to_string(), "NF 'SMF' not found in catalog");
    }

    #[test]
    fn summary() {
        let mut result = BenchmarkResult::new();
        result.record_success(Duration::from_millis(100));
        result.record_success(Duration::from_millis(200));
        result.record_failure();
        result.elapsed = Duration::from_secs(1);

        let output = render(|out| write_summary(out, &result).unwrap());
        assert!(output.contains("TOTAL: (3 requests, 1 FAILURES)"), "{output}");
        assert!(output.contains("66.67% success; 3.00 requests/s"));
        assert!(output.contains("avg: 150.00ms; min: 100.00ms; max: 200.00ms"));
        assert!(output.contains("p50: "));
    }

    #[test]
    fn summary_without_successes() {
        let mut result = BenchmarkResult::new();
        result.record_failure();

        let output = render(|out| write_summary(out, &result).unwrap());
        assert!(output.contains("no successful requests"), "{output}");
        assert!(!output.contains("avg:"));
    }

    #[test]
    fn plan_details() {
        let mut plan = ExecutionPlan::new(
            "AUSF",
            "UeAuthenticationsPost",
            Method::Post,
            "/nausf-auth/v1",
            "/ue-authentications",
        );
        plan.body = Some(serde_json::json!({"supiOrSuci": "imsi-1"}));

        let output = render(|out| {
            write_plan(out, &plan, "http://10.0.0.2:8000/nausf-auth/v1/ue-authentications").unwrap()
        });
        assert!(output.contains("UeAuthenticationsPost [POST]"), "{output}");
        assert!(output.contains(r#"body:   {"supiOrSuci":"imsi-1"}"#));
    }
}
