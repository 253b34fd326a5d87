//! Ad records decoded from the JSON text the search tools return.
//!
//! The payload is owned by the remote server and only a handful of fields are
//! read. Every accessor tolerates missing or oddly typed fields.

use serde_json::Value;

/// Maximum number of characters shown from an ad's creative body.
pub const SNIPPET_CHARS: usize = 100;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ad {
    pub page_name: Option<String>,
    pub id: Option<String>,
    pub ad_creative_bodies: Vec<String>,
}

impl Ad {
    pub fn from_value(value: &Value) -> Self {
        Self {
            page_name: value.get("page_name").and_then(scalar_to_string),
            id: value.get("id").and_then(scalar_to_string),
            ad_creative_bodies: value
                .get("ad_creative_bodies")
                .and_then(Value::as_array)
                .map(|bodies| {
                    bodies
                        .iter()
                        .filter_map(|b| b.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// The first creative body cut to [`SNIPPET_CHARS`] characters.
    pub fn snippet(&self) -> Option<&str> {
        self.ad_creative_bodies
            .first()
            .map(|body| truncate_chars(body, SNIPPET_CHARS))
    }
}

/// The decoded `content[0].text` of a search tool response that carries an
/// `ads` list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdsPage {
    pub ads: Vec<Ad>,
    /// Count reported by the server, which may differ from `ads.len()`.
    pub ads_found: Option<u64>,
}

impl AdsPage {
    /// Returns `None` when the payload has no `ads` array.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let ads = payload.get("ads")?.as_array()?;
        Some(Self {
            ads: ads.iter().map(Ad::from_value).collect(),
            ads_found: payload.get("ads_found").and_then(Value::as_u64),
        })
    }

    pub fn len(&self) -> usize {
        self.ads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ads.is_empty()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
