//! Test utilities for `ads_mcp_probe`.
//!
//! [`ScriptedTransport`] stands in for the HTTP transport: it replays a fixed
//! list of responses in order and records every request it was given, so
//! tests can drive the tool wrappers and the menu loop without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    error::{Error, Result},
    schema::JSONRPCRequest,
    transport::Transport,
};

/// A transport that answers from a script. Clones share the same script and
/// request log.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<Value>>>>,
    requests: Arc<Mutex<Vec<JSONRPCRequest>>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = Result<Value>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().collect())),
            requests: Arc::default(),
        }
    }

    /// Every request posted so far, oldest first.
    pub fn requests(&self) -> Vec<JSONRPCRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, request: &JSONRPCRequest) -> Result<Value> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| Err(Error::Transport("script exhausted".into())))
    }
}

/// Wrap a decoded tool payload the way the server does: serialised to a
/// string inside the first text content block.
pub fn tool_response(payload: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "content": [{"type": "text", "text": payload.to_string()}]
        }
    })
}

/// A `check_auth_status` response.
pub fn auth_response(authenticated: bool) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "authenticated": authenticated,
            "user_id": "u1",
            "has_facebook": true
        }
    })
}
