//! Client configuration and the command line that produces it.

use std::time::Duration;

use clap::Parser;

use crate::error::{Error, Result};
use crate::retry::RetryConfig;

pub const DEFAULT_ENDPOINT: &str = "https://mcp.drivenmetrics.com/mcp-api";

/// Interactive probe for an MCP server exposing Facebook Ad Library search tools.
#[derive(Parser, Debug)]
#[command(name = "ads-mcp-probe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON-RPC endpoint of the MCP server
    #[arg(long, env = "ADS_MCP_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bearer token sent with every request
    #[arg(long, env = "ADS_MCP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub timeout: u64,

    /// Extra attempts for requests that fail at the transport level
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Print the tools the server exposes and exit
    #[arg(long)]
    pub list_tools: bool,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Everything the client needs at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub token: String,
    pub retry: RetryConfig,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl TryFrom<&Cli> for ClientConfig {
    type Error = Error;

    fn try_from(cli: &Cli) -> Result<Self> {
        let token = cli
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Config("no bearer token: pass --token or set ADS_MCP_TOKEN".into()))?;

        let endpoint = cli.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::Config(format!(
                "endpoint must be an http(s) URL, got {endpoint:?}"
            )));
        }
        if cli.timeout == 0 {
            return Err(Error::Config("timeout must be at least one second".into()));
        }

        let retry = RetryConfig::default()
            .with_timeout(Duration::from_secs(cli.timeout))
            .with_retries(cli.retries);
        Ok(ClientConfig::new(endpoint, token).with_retry(retry))
    }
}
