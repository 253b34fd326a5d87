//! Wrappers for the three remote tools and the text reports built from their
//! responses.

use std::fmt::Write;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::ads::AdsPage;
use crate::client::Client;
use crate::schema::{CallToolParams, CallToolResult, ErrorObject, ListToolsResult};

pub const CHECK_AUTH_STATUS: &str = "check_auth_status";
pub const SEARCH_COMPETITOR_ADS: &str = "search_competitor_ads";
pub const SEARCH_ADS_BY_PAGE: &str = "search_ads_by_page";

pub const DEFAULT_COUNTRY: &str = "IT";
pub const DEFAULT_LIMIT: u32 = 10;

/// Number of ads listed in a keyword search report.
const PREVIEW_ADS: usize = 3;

/// Outcome of `check_auth_status`, read from the response's `result` mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub user_id: Option<String>,
    pub has_facebook: bool,
}

impl AuthStatus {
    pub fn from_response(response: &Value) -> Self {
        let empty = Map::new();
        let result = response
            .get("result")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        if result.contains_key("authenticated") {
            return Self::from_fields(result);
        }

        // Some deployments wrap the status in a text block like the search tools.
        let nested = serde_json::from_value::<CallToolResult>(Value::Object(result.clone()))
            .ok()
            .and_then(|r| r.first_text().map(String::from))
            .and_then(|text| serde_json::from_str::<Value>(&text).ok());
        match nested.as_ref().and_then(Value::as_object) {
            Some(fields) => Self::from_fields(fields),
            None => Self::from_fields(result),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            authenticated: fields.get("authenticated").is_some_and(is_truthy),
            user_id: fields.get("user_id").and_then(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }),
            has_facebook: fields.get("has_facebook").is_some_and(is_truthy),
        }
    }

    pub fn report(&self) -> String {
        if !self.authenticated {
            return "Authentication failed!\n".to_string();
        }
        format!(
            "Authenticated as user: {}\nFacebook connected: {}\n",
            self.user_id.as_deref().unwrap_or("N/A"),
            self.has_facebook
        )
    }
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Arguments of `search_competitor_ads`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordSearch {
    pub keywords: String,
    pub country: String,
    pub limit: u32,
}

impl KeywordSearch {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            country: DEFAULT_COUNTRY.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn params(&self) -> CallToolParams {
        CallToolParams::new(SEARCH_COMPETITOR_ADS)
            .with_argument("keywords", self.keywords.as_str())
            .with_argument("country", self.country.as_str())
            .with_argument("limit", self.limit)
    }
}

/// Arguments of `search_ads_by_page`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSearch {
    pub page_id: String,
    pub limit: u32,
}

impl PageSearch {
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn params(&self) -> CallToolParams {
        CallToolParams::new(SEARCH_ADS_BY_PAGE)
            .with_argument("page_id", self.page_id.as_str())
            .with_argument("limit", self.limit)
    }
}

/// Classification of a search tool response.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// The response carries a top-level `error` instead of a `result`: either
    /// the body the request helper built after a transport failure, or a
    /// JSON-RPC error object from the server.
    Error { message: String, response: Value },
    /// The response has no `result`.
    MissingResult { response: Value },
    /// `result` has no content blocks.
    NoContent,
    /// The first text block is not JSON.
    Undecodable { text: String, error: String },
    /// The decoded payload has no `ads` list.
    NoAds { payload: Value, error: Option<String> },
    Ads(AdsPage),
}

impl ToolOutcome {
    pub fn classify(response: Value) -> Self {
        let Some(result) = response.get("result") else {
            return match response.get("error") {
                Some(error) => ToolOutcome::Error {
                    message: describe_error(error),
                    response,
                },
                None => ToolOutcome::MissingResult { response },
            };
        };

        let result = match serde_json::from_value::<CallToolResult>(result.clone()) {
            Ok(result) => result,
            Err(e) => {
                debug!("Unreadable tool result: {}", e);
                return ToolOutcome::NoContent;
            }
        };
        let Some(text) = result.first_text() else {
            return ToolOutcome::NoContent;
        };

        let payload: Value = match serde_json::from_str(text) {
            Ok(payload) => payload,
            Err(e) => {
                return ToolOutcome::Undecodable {
                    text: text.to_string(),
                    error: e.to_string(),
                }
            }
        };

        match AdsPage::from_payload(&payload) {
            Some(page) => ToolOutcome::Ads(page),
            None => ToolOutcome::NoAds {
                error: payload
                    .get("error")
                    .and_then(Value::as_str)
                    .map(String::from),
                payload,
            },
        }
    }

    /// Text shared by both search reports for every outcome except `Ads`.
    fn failure_report(&self, out: &mut String) {
        match self {
            ToolOutcome::Error { message, response } => {
                let _ = writeln!(out, "Error in response: {message}");
                let _ = writeln!(out, "{}", pretty(response));
            }
            ToolOutcome::MissingResult { response } => {
                let _ = writeln!(out, "Error in response");
                let _ = writeln!(out, "{}", pretty(response));
            }
            ToolOutcome::NoContent | ToolOutcome::Ads(_) => {}
            ToolOutcome::Undecodable { text, error } => {
                let _ = writeln!(out, "Could not decode tool output: {error}");
                let _ = writeln!(out, "{text}");
            }
            ToolOutcome::NoAds { payload, error } => {
                let _ = writeln!(out, "No ads found");
                if let Some(error) = error {
                    let _ = writeln!(out, "Server reported: {error}");
                }
                let _ = writeln!(out, "{}", pretty(payload));
            }
        }
    }

    /// Report for a keyword search: the ad count and a preview of the first ads.
    pub fn keyword_report(&self) -> String {
        let mut out = String::new();
        let ToolOutcome::Ads(page) = self else {
            self.failure_report(&mut out);
            return out;
        };

        let _ = writeln!(out, "Found {} ads", page.len());
        for (i, ad) in page.ads.iter().take(PREVIEW_ADS).enumerate() {
            let _ = writeln!(out, "\nAd {}:", i + 1);
            let _ = writeln!(out, "  - Page: {}", ad.page_name.as_deref().unwrap_or("N/A"));
            let _ = writeln!(out, "  - ID: {}", ad.id.as_deref().unwrap_or("N/A"));
            if let Some(snippet) = ad.snippet() {
                let _ = writeln!(out, "  - Text: {snippet}...");
            }
        }
        out
    }

    /// Report for a page search: only the ad count.
    pub fn page_report(&self, page_id: &str) -> String {
        let mut out = String::new();
        match self {
            ToolOutcome::Ads(page) => {
                let _ = writeln!(out, "Found {} ads for {}", page.len(), page_id);
            }
            other => other.failure_report(&mut out),
        }
        out
    }
}

fn describe_error(error: &Value) -> String {
    if let Some(message) = error.as_str() {
        return message.to_string();
    }
    match serde_json::from_value::<ErrorObject>(error.clone()) {
        Ok(rpc) => format!("JSON-RPC error {}: {}", rpc.code, rpc.message),
        Err(_) => error.to_string(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Call `check_auth_status`. Returns the raw response for display alongside
/// the parsed status.
pub async fn check_auth_status(client: &Client) -> (Value, AuthStatus) {
    let response = client.call_tool(CallToolParams::new(CHECK_AUTH_STATUS)).await;
    let status = AuthStatus::from_response(&response);
    info!(authenticated = status.authenticated, "Checked auth status");
    (response, status)
}

pub async fn search_competitor_ads(client: &Client, search: &KeywordSearch) -> ToolOutcome {
    info!(keywords = %search.keywords, country = %search.country, limit = search.limit, "Searching ads by keyword");
    ToolOutcome::classify(client.call_tool(search.params()).await)
}

pub async fn search_ads_by_page(client: &Client, search: &PageSearch) -> ToolOutcome {
    info!(page_id = %search.page_id, limit = search.limit, "Searching ads by page");
    ToolOutcome::classify(client.call_tool(search.params()).await)
}

/// Render a `tools/list` response: one line per tool, or the raw body when it
/// does not look like a tool list.
pub fn tools_report(response: &Value) -> String {
    let tools = response
        .get("result")
        .cloned()
        .and_then(|r| serde_json::from_value::<ListToolsResult>(r).ok());
    let Some(list) = tools else {
        return format!("{}\n", pretty(response));
    };

    let mut out = String::new();
    for tool in &list.tools {
        let _ = writeln!(
            out,
            "- {}: {}",
            tool.name,
            tool.description.as_deref().unwrap_or("No description")
        );
    }
    if list.tools.is_empty() {
        let _ = writeln!(out, "Server exposes no tools");
    }
    out
}
