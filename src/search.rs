//! CLI search runner.
//!
//! Turns command-line arguments into a [`Searcher`] and prints either the
//! rendered URL (`csearch url`) or the parsed results (`csearch search`).

use anyhow::{bail, Result};

use crate::config::SearchConfig;
use crate::response::{Facet, SearchHit, SearchResponse};
use crate::searcher::Searcher;

/// Search parameters collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub query: Option<String>,
    /// `field=value` pairs; repeated fields OR their values together.
    pub boolean: Vec<(String, String)>,
    pub filters: Vec<String>,
    pub facets: Vec<String>,
    /// `facet=value` pairs; repeated facets accumulate values.
    pub constraints: Vec<(String, String)>,
    pub fields: Vec<String>,
    pub rank: Option<String>,
    pub size: Option<u32>,
    pub page: Option<i64>,
}

pub fn build_searcher(config: &SearchConfig, args: &SearchArgs) -> Searcher {
    let mut searcher = Searcher::new(config.clone())
        .with_query(args.query.clone().unwrap_or_default())
        .with_boolean_query(group_pairs(&args.boolean))
        .with_fields(args.fields.iter().cloned())
        .with_facets(args.facets.iter().cloned())
        .with_facet_constraints(group_pairs(&args.constraints))
        .with_items_per_page(args.size)
        .at_page(args.page);

    for filter in &args.filters {
        searcher = searcher.with_filter(filter.clone());
    }
    if let Some(ref rank) = args.rank {
        searcher = searcher.ranked_by(rank.clone());
    }

    searcher
}

/// Group `key=value` pairs by key, keeping first-seen key order.
fn group_pairs(pairs: &[(String, String)]) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in pairs {
        match grouped.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value.clone()),
            None => grouped.push((key.clone(), vec![value.clone()])),
        }
    }
    grouped
}

pub fn run_url(config: &SearchConfig, args: &SearchArgs) -> Result<()> {
    let url = build_searcher(config, args).url()?;
    println!("{}", url);
    Ok(())
}

pub fn run_search(config: &SearchConfig, args: &SearchArgs, json: bool) -> Result<()> {
    let response = build_searcher(config, args).search()?;

    if json {
        println!("{}", response.body());
        return Ok(());
    }

    if response.http_code() != 200 {
        let details = response
            .messages()
            .map(|msgs| {
                msgs.iter()
                    .map(|m| format!("{}: {}", m.code, m.message))
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .ok()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| response.body().chars().take(500).collect());
        bail!("Search failed (HTTP {}): {}", response.http_code(), details);
    }

    print_response(&response)
}

fn print_response(response: &SearchResponse) -> Result<()> {
    if !response.is_found()? {
        println!("No results.");
        return Ok(());
    }

    println!(
        "{} hits (page {} of {})",
        response.hits()?,
        response.current_page()?,
        response.total_pages()?
    );
    if let Some(rank) = response.rank()? {
        println!("rank: {}", rank);
    }
    println!();

    let offset = response.start()?;
    for (i, hit) in response.results()?.iter().enumerate() {
        println!("{}. {}", offset + i as u64 + 1, describe_hit(hit));
    }

    let facets = response.facets()?;
    if !facets.is_empty() {
        println!();
        println!("facets:");
        for (name, facet) in &facets {
            println!("  {}: {}", name, describe_facet(facet));
        }
    }

    Ok(())
}

fn describe_hit(hit: &SearchHit) -> String {
    let fields = hit
        .data
        .keys()
        .map(|name| format!("{}={}", name, hit.field(name).join("|")))
        .collect::<Vec<_>>();

    if fields.is_empty() {
        hit.id.clone()
    } else {
        format!("[{}] {}", hit.id, fields.join("  "))
    }
}

fn describe_facet(facet: &Facet) -> String {
    let mut parts = facet
        .counts
        .iter()
        .map(|(value, count)| format!("{} ({})", value, count))
        .collect::<Vec<_>>();
    if let Some((min, max)) = facet.range() {
        parts.push(format!("{}..{}", min, max));
    }
    parts.join(", ")
}
