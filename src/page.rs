//! Page snapshot and navigation capability.
//!
//! Extraction never talks to the browser directly. Navigation produces a
//! `Page` — a parsed snapshot of the rendered document — and all field
//! extractors run against that snapshot with CSS selectors and structural
//! traversal. The `PageSource` trait is the only seam that touches the
//! network, so extractors are testable against fixture HTML.

use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Transport-level failure: the page-query capability itself broke.
/// Ordinary field absence is never represented here.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Browser error: {0}")]
    Browser(String),
}

/// A parsed snapshot of one rendered page.
pub struct Page {
    url: String,
    document: Html,
}

impl Page {
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// All elements matching a CSS selector. An unparsable selector
    /// degrades to an empty result rather than an error; extraction is
    /// best-effort per field.
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).collect(),
            Err(_) => {
                debug!("Unparsable selector '{}'", css);
                Vec::new()
            }
        }
    }

    pub fn document(&self) -> &Html {
        &self.document
    }
}

/// Elements matching a CSS selector within another element's subtree.
pub fn select_within<'a>(element: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => element.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Walk up the structural ancestry from `element` looking for the nearest
/// ancestor with the given tag, giving up after `max_hops` parents so a
/// malformed document cannot send the walk off unbounded.
pub fn ancestor_with_tag<'a>(
    element: ElementRef<'a>,
    tag: &str,
    max_hops: usize,
) -> Option<ElementRef<'a>> {
    let mut current = element;
    for _ in 0..max_hops {
        let parent = ElementRef::wrap(current.parent()?)?;
        if parent.value().name().eq_ignore_ascii_case(tag) {
            return Some(parent);
        }
        current = parent;
    }
    None
}

/// The navigate capability: fetch a URL's rendered content as a `Page`.
/// Implementations block until the target is loaded or a bounded timeout
/// elapses; there is no automatic retry.
pub trait PageSource {
    fn goto(&mut self, url: &str) -> Result<Page, PageError>;

    /// URL of the most recent successful navigation.
    fn current_url(&self) -> &str;
}

/// `PageSource` backed by one headless Chrome tab. Navigations replace the
/// tab's content in place; the pipeline is strictly sequential, so one tab
/// is shared for everything.
pub struct ChromeFetcher {
    tab: Arc<headless_chrome::Tab>,
    render_wait: Duration,
    current_url: String,
}

impl ChromeFetcher {
    pub fn new(
        browser: &headless_chrome::Browser,
        page_load_timeout: Duration,
        render_wait: Duration,
    ) -> Result<Self, PageError> {
        let tab = browser
            .new_tab()
            .map_err(|e| PageError::Browser(format!("Failed to create browser tab: {}", e)))?;
        tab.set_default_timeout(page_load_timeout);

        Ok(Self {
            tab,
            render_wait,
            current_url: String::new(),
        })
    }

    /// The underlying tab, for glue that needs direct input (login form).
    pub fn tab(&self) -> &Arc<headless_chrome::Tab> {
        &self.tab
    }
}

impl PageSource for ChromeFetcher {
    fn goto(&mut self, url: &str) -> Result<Page, PageError> {
        debug!("Navigating to {}", url);

        self.tab.navigate_to(url).map_err(|e| PageError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        self.tab.wait_until_navigated().map_err(|e| PageError::Navigation {
            url: url.to_string(),
            reason: format!("page failed to load: {}", e),
        })?;

        // Client-side rendering needs a moment after the navigation event.
        std::thread::sleep(self.render_wait);

        let content = self.tab.get_content().map_err(|e| PageError::Navigation {
            url: url.to_string(),
            reason: format!("failed to read page content: {}", e),
        })?;

        self.current_url = self.tab.get_url();
        Ok(Page::parse(self.current_url.clone(), &content))
    }

    fn current_url(&self) -> &str {
        &self.current_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_returns_matches_in_document_order() {
        let page = Page::parse(
            "https://example.com",
            "<ul><li>first</li><li>second</li></ul>",
        );
        let items = page.select("li");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text().collect::<String>(), "first");
    }

    #[test]
    fn test_bad_selector_degrades_to_empty() {
        let page = Page::parse("https://example.com", "<p>hi</p>");
        assert!(page.select(":::nonsense").is_empty());
    }

    #[test]
    fn test_ancestor_walk_finds_nearest_li() {
        let page = Page::parse(
            "u",
            "<ul><li id='outer'><ul><li id='inner'><div><span><svg><path d='M1'/></svg></span></div></li></ul></li></ul>",
        );
        let path = page.select("path")[0];
        let li = ancestor_with_tag(path, "li", 10).unwrap();
        assert_eq!(li.value().attr("id"), Some("inner"));
    }

    #[test]
    fn test_ancestor_walk_is_bounded() {
        // Nine wrapper divs put the li ten hops up; a cap of 3 must give up.
        let html = format!(
            "<li>{}<path d='M1'/>{}</li>",
            "<div>".repeat(9),
            "</div>".repeat(9)
        );
        let page = Page::parse("u", &html);
        let path = page.select("path")[0];
        assert!(ancestor_with_tag(path, "li", 3).is_none());
        assert!(ancestor_with_tag(path, "li", 10).is_some());
    }
}
