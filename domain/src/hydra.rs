//! Hydra collection handling.

use serde_json::Value;
use url::Url;

const MEMBER: &str = "hydra:member";
const VIEW: &str = "hydra:view";
const LAST: &str = "hydra:last";
const TOTAL_ITEMS: &str = "hydra:totalItems";

/// Pagination hints of a Hydra collection. Missing or malformed hints fall back to
/// a single page and zero items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub max_page: u64,
    pub total_items: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            max_page: 1,
            total_items: 0,
        }
    }
}

impl Pagination {
    pub fn from_body(body: &Value) -> Self {
        let max_page = body
            .get(VIEW)
            .and_then(|view| view.get(LAST))
            .and_then(Value::as_str)
            .and_then(page_of)
            .unwrap_or(1)
            .max(1);

        let total_items = body
            .get(TOTAL_ITEMS)
            .and_then(|total| match total {
                Value::String(s) => s.parse().ok(),
                other => other.as_u64(),
            })
            .unwrap_or(0);

        Self {
            max_page,
            total_items,
        }
    }
}

/// `hydra:member` when present, the whole body otherwise.
pub fn members(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key(MEMBER) => {
            map.remove(MEMBER).unwrap_or(Value::Null)
        }
        other => other,
    }
}

// `hydra:last` is usually a relative IRI such as `/api/orders?page=7`
fn page_of(link: &str) -> Option<u64> {
    let base = Url::parse("http://hydra.invalid/").ok()?;
    let url = base.join(link).ok()?;
    url.query_pairs()
        .find(|(name, _)| name == "page")
        .and_then(|(_, value)| value.parse().ok())
}
