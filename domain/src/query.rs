//! Query-string building for API requests.
//!
//! A [`Query`] is an immutable value passed into each call. Plain parameters live in an
//! insertion-ordered list where a repeated name overwrites the earlier value in place.
//! Array-style names ending in `[]` are appended to a raw fragment instead, so the same
//! name can be sent several times.

use std::fmt;

use url::form_urlencoded;

const ARRAY_SUFFIX: &str = "[]";
const ORDER_PREFIX: &str = "order[";

/// Sort direction for [`Query::with_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Asc,
    Desc,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Asc => "asc",
            Sort::Desc => "desc",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
    additional: String,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name=value`. Empty names or values are ignored.
    #[must_use]
    pub fn with(self, name: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        if name.is_empty() || value.is_empty() {
            return self;
        }
        self.insert(name, &value)
    }

    /// Add `name=` with an explicitly empty value.
    #[must_use]
    pub fn with_empty(self, name: &str) -> Self {
        if name.is_empty() {
            return self;
        }
        self.insert(name, "")
    }

    /// Remove `name`. For array-style names every occurrence is removed.
    #[must_use]
    pub fn without(mut self, name: &str) -> Self {
        if name.ends_with(ARRAY_SUFFIX) {
            self.additional = self
                .additional
                .split('&')
                .filter(|pair| !pair.is_empty() && pair_name(pair) != name)
                .fold(String::new(), |mut acc, pair| {
                    acc.push('&');
                    acc.push_str(pair);
                    acc
                });
        } else {
            self.params.retain(|(n, _)| n != name);
        }
        self
    }

    /// Request page `page` of a Hydra collection.
    #[must_use]
    pub fn with_page(self, page: u64) -> Self {
        self.with("page", page)
    }

    /// Sort on `property`, replacing any previous ordering.
    #[must_use]
    pub fn with_order(mut self, property: &str, sort: Sort) -> Self {
        self.params.retain(|(n, _)| !n.starts_with(ORDER_PREFIX));
        self.with(&format!("{ORDER_PREFIX}{property}]"), sort)
    }

    /// Offset/limit paging: `$top=per_page` and `$skip` for the 1-based `page`.
    #[must_use]
    pub fn with_offset_limit(self, page: u64, per_page: u64) -> Self {
        let skip = page.saturating_sub(1).saturating_mul(per_page);
        self.with("$top", per_page).with("$skip", skip)
    }

    /// Comma-joined list such as `$select=ID,Name`. An empty list adds nothing.
    #[must_use]
    pub fn with_list(self, name: &str, values: &[&str]) -> Self {
        self.with(name, values.join(","))
    }

    /// Value of a plain parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The raw array-style fragment, each pair prefixed with `&`.
    pub fn additional(&self) -> &str {
        &self.additional
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.additional.is_empty()
    }

    /// Encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let main = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish();

        if main.is_empty() {
            self.additional.trim_start_matches('&').to_string()
        } else {
            format!("{main}{}", self.additional)
        }
    }

    fn insert(mut self, name: &str, value: &str) -> Self {
        if name.ends_with(ARRAY_SUFFIX) {
            self.additional.push('&');
            self.additional.push_str(name);
            self.additional.push('=');
            self.additional
                .extend(form_urlencoded::byte_serialize(value.as_bytes()));
        } else if let Some(existing) = self.params.iter_mut().find(|(n, _)| n == name) {
            existing.1 = value.to_string();
        } else {
            self.params.push((name.to_string(), value.to_string()));
        }
        self
    }
}

fn pair_name(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(name, _)| name)
}
