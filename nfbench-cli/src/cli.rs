use std::path::PathBuf;

use anyhow::Result;
use argh::FromArgs;

use crate::commands::{self, RunOptions};
use crate::config::Config;
use crate::observability;

/// Benchmarking client for 5G core network function APIs.
#[derive(Debug, FromArgs)]
struct Args {
    /// path to the YAML configuration file
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,

    #[argh(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    List(ListCommand),
    Build(BuildCommand),
    Run(RunCommand),
}

/// list all NFs, or the APIs of one NF
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "list")]
struct ListCommand {
    /// the NF to show, or `all`
    #[argh(positional)]
    nf: Option<String>,
}

/// generate the API catalog and the settings file from the OpenAPI documents
///
/// Overwrites both files. Without an NF, all NFs are included.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "build")]
struct BuildCommand {
    /// restrict the output to this NF
    #[argh(positional)]
    nf: Option<String>,
}

/// execute an API repeatedly and report latency statistics
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "run")]
struct RunCommand {
    /// the target NF type, such as AUSF
    #[argh(option, short = 't')]
    target: String,

    /// the API name as shown by `list`
    #[argh(option, short = 'a')]
    api: String,

    /// number of requests to send
    #[argh(option, short = 'i', default = "1")]
    iterations: u64,

    /// base URL of the target NF, skips NRF discovery
    #[argh(option)]
    url: Option<String>,
}

fn usage() -> String {
    match Args::from_args(&["nfbench"], &["--help"]) {
        Ok(_) => String::new(),
        Err(exit) => exit.output,
    }
}

/// Bootstrap the runtime and execute the CLI command.
pub fn execute() -> Result<()> {
    let args: Args = argh::from_env();

    let Some(command) = args.command else {
        println!("{}", usage());
        return Ok(());
    };

    let config = Config::load(args.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let _runtime_guard = runtime.enter();

    observability::init_tracing(&config);
    tracing::debug!(?config);

    runtime.block_on(async move {
        match command {
            Command::List(ListCommand { nf }) => commands::list(&config, nf.as_deref()),
            Command::Build(BuildCommand { nf }) => {
                commands::build(&config, nf.as_deref()).map(|_| ())
            }
            Command::Run(RunCommand {
                target,
                api,
                iterations,
                url,
            }) => {
                let options = RunOptions {
                    target,
                    api,
                    iterations,
                    url,
                };
                commands::run(&config, &options).await.map(|_| ())
            }
        }
    })
}
