//! Company search against the site's results listing.
//!
//! Navigates to the search page for a query, collects the top results in
//! ranking order, and hands them to the matcher. Disambiguation of an
//! ambiguous outcome is the caller's job; this module never prompts.

use tracing::{debug, info};
use url::Url;

use crate::config::{MatcherConfig, SiteConfig};
use crate::matcher::{self, MatchOutcome, SearchCandidate};
use crate::page::{select_within, Page, PageError, PageSource};

/// Selector for result cards in the initial results section. Later
/// sections repeat earlier queries and must be excluded.
const RESULT_LINK_SELECTOR: &str =
    "search-results-section:not(.not-initial-search-results) mat-card a";

/// Selector for the company name inside a result card.
const RESULT_NAME_SELECTOR: &str = "span.row-name";

/// Build the search URL for a company name.
pub fn search_url(site: &SiteConfig, query: &str) -> Result<String, PageError> {
    let mut url = Url::parse(&site.base_url).map_err(|e| PageError::Navigation {
        url: site.base_url.clone(),
        reason: format!("invalid base URL: {}", e),
    })?;
    url.set_path(&site.search_path);
    url.query_pairs_mut().append_pair("q", query);
    Ok(url.to_string())
}

/// Collect up to `max` candidates from a rendered results page, preserving
/// the listing's ranking order. Cards without a name or destination are
/// skipped, not errors.
pub fn collect_candidates(page: &Page, max: usize) -> Vec<SearchCandidate> {
    let base = Url::parse(page.url()).ok();

    let mut candidates = Vec::new();
    for link in page.select(RESULT_LINK_SELECTOR) {
        if candidates.len() >= max {
            break;
        }

        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(name_el) = select_within(link, RESULT_NAME_SELECTOR).into_iter().next() else {
            continue;
        };

        let name = name_el.text().collect::<String>().trim().to_string();
        if name.is_empty() {
            continue;
        }

        // Hrefs in the listing are site-relative.
        let url = match &base {
            Some(base) => base
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        };

        candidates.push(SearchCandidate { name, url });
    }

    debug!("Collected {} search candidates", candidates.len());
    candidates
}

/// Search for a company and resolve the results against the query.
pub fn search_company<S: PageSource>(
    source: &mut S,
    site: &SiteConfig,
    matcher_config: &MatcherConfig,
    query: &str,
) -> Result<MatchOutcome, PageError> {
    let url = search_url(site, query)?;
    info!("Searching for '{}'", query);

    let page = source.goto(&url)?;
    let candidates = collect_candidates(&page, matcher_config.max_candidates);

    Ok(matcher::resolve(
        &candidates,
        query,
        matcher_config.similarity_threshold,
    ))
}
