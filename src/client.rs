use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::retry::{with_retry, RetryConfig};
use crate::schema::*;
use crate::transport::{HttpTransport, Transport};

/// JSON-RPC client for the ads MCP endpoint.
pub struct Client {
    transport: Box<dyn Transport>,
    retry: RetryConfig,
}

impl Client {
    /// Create a client over an arbitrary transport.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            retry: RetryConfig::default(),
        }
    }

    /// Create an HTTP client from configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.endpoint, &config.token)?;
        Ok(Self::new(Box::new(transport)).with_retry(config.retry.clone()))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Send a request and return the decoded body, or the error that stopped it.
    pub async fn try_request(&self, method: &str, params: Value) -> Result<Value> {
        let request = JSONRPCRequest::new(method, params);
        let transport = self.transport.as_ref();
        let response = with_retry(&self.retry, method, || transport.post(&request)).await?;
        debug!("Received response for {}: {}", method, response);
        Ok(response)
    }

    /// Send a request. Failures come back as an `{"error": "..."}` body
    /// instead of an `Err`.
    pub async fn request(&self, method: &str, params: Value) -> Value {
        match self.try_request(method, params).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request {} failed: {}", method, e);
                error_response(e.to_string())
            }
        }
    }

    /// Invoke a remote tool through `tools/call`.
    pub async fn call_tool(&self, params: CallToolParams) -> Value {
        debug!("Calling tool {}", params.name);
        match serde_json::to_value(&params) {
            Ok(value) => self.request("tools/call", value).await,
            Err(e) => error_response(e.to_string()),
        }
    }

    /// List the tools the server exposes.
    pub async fn list_tools(&self) -> Value {
        self.request("tools/list", serde_json::json!({})).await
    }
}
