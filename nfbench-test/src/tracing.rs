use tracing_subscriber::EnvFilter;

/// Crates whose logs are captured at `TRACE`. Everything else only logs errors.
const CRATE_NAMES: &[&str] = &[
    "nfbench",
    "nfbench_cli",
    "nfbench_client",
    "nfbench_openapi",
    "nfbench_types",
];

fn env_filter() -> EnvFilter {
    let directives = CRATE_NAMES
        .iter()
        .map(|name| format!("{name}=TRACE"))
        .fold(String::from("ERROR"), |acc, directive| acc + "," + &directive);
    EnvFilter::new(directives)
}

/// Initialize the logger for testing.
///
/// Output goes to the test runner's captured stdout, so logs only show up for failing tests.
/// Calling this more than once is fine.
///
/// # Example
///
/// ```
/// nfbench_test::tracing::init();
/// ```
pub fn init() {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_test_writer()
        .compact()
        .try_init()
        .ok();
}
