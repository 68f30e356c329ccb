//! The `nfbench` binary.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

fn main() -> anyhow::Result<()> {
    nfbench_cli::cli::execute()
}
