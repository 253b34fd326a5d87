//! ads-mcp-probe: interactive probe for an MCP server exposing Facebook Ad
//! Library search tools.

use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use ads_mcp_probe::{tools, Cli, Client, ClientConfig, ExitReason, Session};

fn get_log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Logs go to stderr so they stay out of the interactive transcript.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli, config: &ClientConfig) -> ads_mcp_probe::Result<ExitReason> {
    let client = Client::from_config(config)?;

    if cli.list_tools {
        let response = client.list_tools().await;
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(tools::tools_report(&response).as_bytes())
            .await?;
        stdout.flush().await?;
        return Ok(ExitReason::UserExit);
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut session = Session::new(&client, stdin, tokio::io::stdout());
    session.run().await
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(get_log_level(cli.verbose, cli.quiet));

    let config = match ClientConfig::try_from(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&cli, &config)) {
        Ok(reason) => {
            info!(?reason, "Session finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Session failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
