//! Wrapper around a raw CloudSearch search reply.
//!
//! The body is parsed on first access and cached. A malformed body is
//! reported by every parsed accessor as [`Error::MalformedResponse`]; it is
//! never silently replaced by an empty result.
//!
//! A 2011-02-01 search reply looks like:
//!
//! ```json
//! {
//!   "rank": "-text_relevance",
//!   "match-expr": "(label 'star wars')",
//!   "hits": {
//!     "found": 7,
//!     "start": 0,
//!     "hit": [{ "id": "tt1234", "data": { "title": ["A New Hope"] } }]
//!   },
//!   "facets": {
//!     "genre": { "constraints": [{ "value": "Action", "count": 7 }] },
//!     "year": { "min": 1977, "max": 2008 }
//!   }
//! }
//! ```

use std::cell::OnceCell;
use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// One result record: the document id and its returned fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl SearchHit {
    /// String values of a returned field.
    ///
    /// CloudSearch returns every field as an array; a bare string is
    /// accepted too.
    pub fn field(&self, name: &str) -> Vec<&str> {
        match self.data.get(name) {
            Some(serde_json::Value::Array(values)) => {
                values.iter().filter_map(|v| v.as_str()).collect()
            }
            Some(serde_json::Value::String(value)) => vec![value.as_str()],
            _ => Vec::new(),
        }
    }
}

/// Aggregated summary for one facet.
///
/// Text facets carry value/count pairs in the order the service returned
/// them; numeric facets carry a `min`/`max` range. A facet may carry both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facet {
    pub counts: Vec<(String, u64)>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Facet {
    pub fn count(&self, value: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, c)| *c)
    }

    /// `(min, max)` when the service reported both bounds.
    pub fn range(&self) -> Option<(f64, f64)> {
        Some((self.min?, self.max?))
    }
}

/// A service message, present on error replies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Payload {
    #[serde(default)]
    rank: Option<String>,
    #[serde(default, rename = "match-expr")]
    match_expr: Option<String>,
    #[serde(default)]
    hits: Hits,
    #[serde(default)]
    facets: BTreeMap<String, RawFacet>,
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Hits {
    #[serde(default)]
    found: u64,
    #[serde(default)]
    start: u64,
    #[serde(default)]
    hit: Vec<SearchHit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawFacet {
    #[serde(default)]
    constraints: Vec<RawConstraint>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawConstraint {
    value: String,
    count: u64,
}

impl From<&RawFacet> for Facet {
    fn from(raw: &RawFacet) -> Self {
        Facet {
            counts: raw
                .constraints
                .iter()
                .map(|c| (c.value.clone(), c.count))
                .collect(),
            min: raw.min,
            max: raw.max,
        }
    }
}

/// HTTP status and body of one search, with parsed accessors.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    http_code: u16,
    body: String,
    items_per_page: u32,
    payload: OnceCell<Payload>,
}

impl SearchResponse {
    pub fn new(http_code: u16, body: impl Into<String>, items_per_page: u32) -> Self {
        Self {
            http_code,
            body: body.into(),
            items_per_page: items_per_page.max(1),
            payload: OnceCell::new(),
        }
    }

    pub fn http_code(&self) -> u16 {
        self.http_code
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    fn payload(&self) -> Result<&Payload> {
        if let Some(payload) = self.payload.get() {
            return Ok(payload);
        }
        let parsed: Payload = serde_json::from_str(&self.body).map_err(Error::from)?;
        Ok(self.payload.get_or_init(|| parsed))
    }

    /// True when the request succeeded and matched at least one document.
    pub fn is_found(&self) -> Result<bool> {
        Ok(self.http_code == 200 && self.hits()? > 0)
    }

    /// Total number of matching documents.
    pub fn hits(&self) -> Result<u64> {
        Ok(self.payload()?.hits.found)
    }

    /// Offset of the first returned hit.
    pub fn start(&self) -> Result<u64> {
        Ok(self.payload()?.hits.start)
    }

    pub fn results(&self) -> Result<&[SearchHit]> {
        Ok(&self.payload()?.hits.hit)
    }

    pub fn facets(&self) -> Result<BTreeMap<String, Facet>> {
        Ok(self
            .payload()?
            .facets
            .iter()
            .map(|(name, raw)| (name.clone(), Facet::from(raw)))
            .collect())
    }

    pub fn rank(&self) -> Result<Option<&str>> {
        Ok(self.payload()?.rank.as_deref())
    }

    pub fn match_expr(&self) -> Result<Option<&str>> {
        Ok(self.payload()?.match_expr.as_deref())
    }

    pub fn messages(&self) -> Result<&[Message]> {
        Ok(&self.payload()?.messages)
    }

    pub fn current_page(&self) -> Result<u64> {
        Ok(self.start()? / self.items_per_page as u64 + 1)
    }

    pub fn total_pages(&self) -> Result<u64> {
        Ok(self.hits()?.div_ceil(self.items_per_page as u64))
    }

    pub fn has_pagination(&self) -> Result<bool> {
        Ok(self.hits()? > self.items_per_page as u64)
    }
}
