//! # CloudSearch Client
//!
//! A fluent query builder and blocking client for the CloudSearch
//! (2011-02-01) search API.
//!
//! A [`Searcher`] collects search parameters through chained calls, renders
//! them into a percent-encoded URL, issues one `GET`, and returns a
//! [`SearchResponse`] that parses hits, results and facets from the body.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ SearchConfig │──▶│  Searcher   │──▶│ GET /search  │
//! │  (TOML/API)  │   │ url()       │   │  (reqwest)   │
//! └──────────────┘   └─────────────┘   └──────┬───────┘
//!                                             ▼
//!                                     ┌────────────────┐
//!                                     │ SearchResponse │
//!                                     └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! csearch url "star wars" --field title --field year
//! csearch search "star wars" --facet genre --bq genre=Sci-Fi
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`error`] | Error type and `Result` alias |
//! | [`searcher`] | Query builder and request execution |
//! | [`response`] | Parsed view of a search reply |
//! | [`search`] | CLI search runner |

pub mod config;
pub mod error;
pub mod response;
pub mod search;
pub mod searcher;

pub use config::SearchConfig;
pub use error::{Error, Result};
pub use response::{Facet, SearchHit, SearchResponse};
pub use searcher::{Searcher, Values};
