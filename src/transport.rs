use async_trait::async_trait;
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client as HttpClient,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    schema::JSONRPCRequest,
};

/// Delivers one JSON-RPC request and hands back the decoded response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: &JSONRPCRequest) -> Result<Value>;
}

/// JSON-RPC over a single HTTP(S) endpoint with a static bearer token.
pub struct HttpTransport {
    endpoint: String,
    client: HttpClient,
    headers: HeaderMap,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::Config("token contains invalid header characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = HttpClient::builder()
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {e}")))?;

        let endpoint = endpoint.into();
        info!("Using MCP endpoint: {}", endpoint);
        Ok(Self {
            endpoint,
            client,
            headers,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: &JSONRPCRequest) -> Result<Value> {
        debug!("HTTP client sending request: {:?}", request);

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Failed to send request to {}: {e}", self.endpoint)))?;

        let status = response.status();
        debug!("HTTP response status: {}", status);

        // The body is decoded regardless of status; servers report JSON-RPC
        // failures with non-2xx codes and a JSON body.
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Http {
            status: Some(status.as_u16()),
            message: format!("HTTP {status}: response body is not JSON ({e})"),
        })
    }
}
