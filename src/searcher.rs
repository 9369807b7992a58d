//! Fluent query builder for the CloudSearch `/search` endpoint.
//!
//! A [`Searcher`] accumulates parameters through chained builder calls and
//! renders them into one percent-encoded URL. [`Searcher::search`] issues a
//! single blocking GET for that URL and wraps the reply in a
//! [`SearchResponse`].
//!
//! ```rust,no_run
//! # use cloudsearch_client::{SearchConfig, Searcher};
//! let config = SearchConfig::new("abc123", "imdb-movies");
//! let response = Searcher::new(config)
//!     .with_query("star wars")
//!     .with_fields(["title", "year"])
//!     .with_facets(["genre"])
//!     .at_page(Some(2))
//!     .search()?;
//! println!("{} hits", response.hits()?);
//! # Ok::<(), cloudsearch_client::Error>(())
//! ```
//!
//! # Rendering
//!
//! Parameters are emitted in a fixed order: `q`, `size`, `start`, then `bq`,
//! `return-fields`, filter expressions, `facet`, `facet-<name>-constraints`
//! and `rank`, each only when set. User-supplied tokens are encoded per
//! RFC 3986; the structural characters of the boolean query (`(`, `)`, `:`,
//! `'`, `|` and spaces) are left literal.

use std::fmt::Write;
use std::time::Duration;

use tracing::debug;

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::response::SearchResponse;

/// Page size used when none has been set.
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;

/// One or more acceptable values for a boolean clause or facet constraint.
///
/// Scalars convert into a single-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values(Vec<String>);

impl Values {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Values {
    fn from(value: &str) -> Self {
        Values(vec![value.to_string()])
    }
}

impl From<String> for Values {
    fn from(value: String) -> Self {
        Values(vec![value])
    }
}

impl From<Vec<&str>> for Values {
    fn from(values: Vec<&str>) -> Self {
        Values(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Values {
    fn from(values: Vec<String>) -> Self {
        Values(values)
    }
}

impl From<&[&str]> for Values {
    fn from(values: &[&str]) -> Self {
        Values(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Values {
    fn from(values: [&str; N]) -> Self {
        Values(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Builder for a single search request.
#[derive(Debug, Clone)]
pub struct Searcher {
    config: SearchConfig,
    query: String,
    boolean_queries: Vec<(String, Values)>,
    filters: Vec<String>,
    facets: Vec<String>,
    facet_constraints: Vec<(String, Values)>,
    fields: Vec<String>,
    items_per_page: Option<u32>,
    page_number: Option<u32>,
    rank: Option<String>,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            query: String::new(),
            boolean_queries: Vec::new(),
            filters: Vec::new(),
            facets: Vec::new(),
            facet_constraints: Vec::new(),
            fields: Vec::new(),
            items_per_page: None,
            page_number: None,
            rank: None,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Set the free-text query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Merge field clauses into the boolean query.
    ///
    /// A field that is already present keeps its position and has its values
    /// replaced. Entries with no values are ignored.
    pub fn with_boolean_query<I, K, V>(mut self, clauses: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Values>,
    {
        for (field, values) in clauses {
            let values = values.into();
            if values.is_empty() {
                continue;
            }
            upsert(&mut self.boolean_queries, field.into(), values);
        }
        self
    }

    /// Append a raw filter expression such as `t-product_active=1`.
    ///
    /// Filters are emitted verbatim, so the caller is responsible for their
    /// encoding. Blank expressions are ignored.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.trim().is_empty() {
            self.filters.push(filter);
        }
        self
    }

    pub fn with_facets<I, S>(mut self, facets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facets.extend(facets.into_iter().map(Into::into));
        self
    }

    /// Replace all facet constraints. Facets with no values are dropped.
    pub fn with_facet_constraints<I, K, V>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Values>,
    {
        let mut replaced = Vec::new();
        for (facet, values) in constraints {
            let values = values.into();
            if values.is_empty() {
                continue;
            }
            upsert(&mut replaced, facet.into(), values);
        }
        self.facet_constraints = replaced;
        self
    }

    pub fn ranked_by(mut self, rank_expression: impl Into<String>) -> Self {
        self.rank = Some(rank_expression.into());
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Set the page size. `None` (or zero) keeps the current value, which
    /// reads as [`DEFAULT_ITEMS_PER_PAGE`] until a size is set.
    pub fn with_items_per_page(mut self, items_per_page: Option<u32>) -> Self {
        if let Some(n) = items_per_page.filter(|n| *n > 0) {
            self.items_per_page = Some(n);
        }
        self
    }

    /// Select a 1-based page. Values below 1 clamp to 1; `None` means "unset",
    /// which reads back as page 1.
    pub fn at_page(mut self, page: Option<i64>) -> Self {
        self.page_number = page.map(|p| p.clamp(1, u32::MAX as i64) as u32);
        self
    }

    /// The free-text query, percent-encoded.
    pub fn query(&self) -> String {
        encode_component(&self.query)
    }

    /// The rendered `(and ...)` expression, or `None` without clauses.
    pub fn boolean_query(&self) -> Option<String> {
        if self.boolean_queries.is_empty() {
            return None;
        }

        let clauses = self
            .boolean_queries
            .iter()
            .map(|(field, values)| format!("{}:'{}'", field, join_encoded(values, "|")))
            .collect::<Vec<_>>()
            .join(" ");

        Some(format!("(and {})", clauses))
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page.unwrap_or(DEFAULT_ITEMS_PER_PAGE)
    }

    pub fn page_number(&self) -> u32 {
        self.page_number.unwrap_or(1)
    }

    /// Offset of the first result on the selected page.
    pub fn start(&self) -> u64 {
        let page = self.page_number();
        if page <= 1 {
            return 0;
        }
        self.items_per_page() as u64 * (page as u64 - 1)
    }

    /// Render the full search URL.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingConfiguration`] if `domain_id` or `domain_name` is unset
    /// - [`Error::InsufficientParameters`] if there is neither a query nor a
    ///   boolean query
    pub fn url(&self) -> Result<String> {
        self.config.check()?;

        if self.query.is_empty() && self.boolean_queries.is_empty() {
            return Err(Error::InsufficientParameters);
        }

        let mut params = vec![
            format!("q={}", self.query()),
            format!("size={}", self.items_per_page()),
            format!("start={}", self.start()),
        ];

        if let Some(bq) = self.boolean_query() {
            params.push(format!("bq={}", bq));
        }

        if !self.fields.is_empty() {
            params.push(format!("return-fields={}", encode_list(&self.fields)));
        }

        params.extend(self.filters.iter().cloned());

        if !self.facets.is_empty() {
            params.push(format!("facet={}", encode_list(&self.facets)));
        }

        for (facet, values) in &self.facet_constraints {
            let quoted = values
                .as_slice()
                .iter()
                .map(|v| format!("'{}'", encode_component(v)))
                .collect::<Vec<_>>()
                .join(",");
            params.push(format!(
                "facet-{}-constraints={}",
                encode_component(facet),
                quoted
            ));
        }

        if let Some(ref rank) = self.rank {
            params.push(format!("rank={}", encode_component(rank)));
        }

        Ok(format!(
            "{}/search?{}",
            self.config.search_url(),
            params.join("&")
        ))
    }

    /// Run the search with a client built from the configured timeout.
    pub fn search(&self) -> Result<SearchResponse> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()?;
        self.search_with(&client)
    }

    /// Run the search on a caller-supplied client.
    ///
    /// Non-2xx statuses are not errors; inspect
    /// [`SearchResponse::http_code`].
    pub fn search_with(&self, client: &reqwest::blocking::Client) -> Result<SearchResponse> {
        let url = self.url()?;
        debug!(%url, "sending search request");

        let resp = client.get(&url).send()?;
        let http_code = resp.status().as_u16();
        let body = resp.text()?;
        debug!(http_code, bytes = body.len(), "received search response");

        Ok(SearchResponse::new(http_code, body, self.items_per_page()))
    }
}

fn upsert(entries: &mut Vec<(String, Values)>, key: String, values: Values) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = values,
        None => entries.push((key, values)),
    }
}

fn join_encoded(values: &Values, sep: &str) -> String {
    values
        .as_slice()
        .iter()
        .map(|v| encode_component(v))
        .collect::<Vec<_>>()
        .join(sep)
}

fn encode_list(items: &[String]) -> String {
    items
        .iter()
        .map(|i| encode_component(i))
        .collect::<Vec<_>>()
        .join(",")
}

/// Percent-encode one query token, leaving only RFC 3986 unreserved
/// characters as-is.
pub fn encode_component(token: &str) -> String {
    let mut encoded = String::with_capacity(token.len());
    for byte in token.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "%{:02X}", byte);
        }
    }
    encoded
}
