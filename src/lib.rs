//! # ads-mcp-probe
//!
//! An interactive client for an MCP server that exposes Facebook Ad Library
//! search tools over JSON-RPC 2.0.
//!
//! ## Overview
//!
//! Every call is a `tools/call` request POSTed to a single endpoint with a
//! static bearer token. The search tools answer with a text content block
//! whose text is itself JSON; [`tools::ToolOutcome`] decodes that second
//! layer and classifies the response without ever failing.
//!
//! ```rust,no_run
//! use ads_mcp_probe::{tools, Client, ClientConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::new("https://example.com/mcp-api", "token");
//!     let client = Client::from_config(&config)?;
//!
//!     let (_, status) = tools::check_auth_status(&client).await;
//!     if status.authenticated {
//!         let search = tools::KeywordSearch::new("running shoes").with_limit(5);
//!         let outcome = tools::search_competitor_ads(&client, &search).await;
//!         print!("{}", outcome.keyword_report());
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod retry;
mod transport;

pub mod ads;
pub mod config;
pub mod menu;
pub mod schema;
pub mod testutils;
pub mod tools;

pub use client::Client;
pub use config::{Cli, ClientConfig};
pub use error::{Error, Result};
pub use menu::{ExitReason, MenuState, Session};
pub use retry::RetryConfig;
pub use transport::{HttpTransport, Transport};
