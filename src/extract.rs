//! Field extractors for the company profile page.
//!
//! The profile page has no reliable semantic markup, so three addressing
//! strategies are used side by side:
//!
//! 1. icon identity — fields whose only stable anchor is the vector icon
//!    next to them are located by SVG path signature, then the walk goes up
//!    to the containing list item and reads its text.
//! 2. label adjacency — fields captioned with human-readable labels
//!    ("Founded Date", "Legal Name", ...) are located by the label words
//!    and read from a per-label value element type.
//! 3. numeric by label — counters ("Acquisitions", "Investments", "Exits")
//!    live inside links next to an exact label.
//!
//! Every extractor returns `Option`: a missing field is a normal outcome,
//! never an error. Only transport failures escalate, and those happen at
//! navigation time, not here.

use scraper::{ElementRef, Node};
use tracing::debug;

use crate::page::{ancestor_with_tag, select_within, Page};

/// How many leading characters of an SVG path signature must match.
/// Renders vary in path precision past this point.
pub const ICON_PREFIX_LEN: usize = 30;

/// Cap on the icon-to-list-item ancestor walk, so malformed structure
/// cannot send it off unbounded.
pub const MAX_ANCESTOR_HOPS: usize = 10;

/// SVG path signatures identifying field icons on the profile page.
pub mod icons {
    pub const LOCATION: &str = "M12,2C8.1,2,5,5.1,5,9c0,5.2,7,13,7,13s7-7.8,7-13C19,5.1,15.9,2,12,2z M12,11.5c-1.4,0-2.5-1.1-2.5-2.5s1.1-2.5,2.5-2.5s2.5,1.1,2.5,2.5S13.4,11.5,12,11.5z";
    pub const EMPLOYEES: &str = "M16.36,10.91a3.28,3.28,0,1,0-3.27-3.27A3.26,3.26,0,0,0,16.36,10.91Zm-8.72,0A3.28,3.28,0,1,0,4.36,7.64,3.26,3.26,0,0,0,7.64,10.91Zm0,2.18C5.09,13.09,0,14.37,0,16.91v2.73H15.27V16.91C15.27,14.37,10.18,13.09,7.64,13.09Zm8.72,0a10.24,10.24,0,0,0-1,.06,4.59,4.59,0,0,1,2.14,3.76v2.73H24V16.91C24,14.37,18.91,13.09,16.36,13.09Z";
    pub const COMPANY_TYPE: &str = "M14.4,6L14,4H5v17h2v-7h5.6l0.4,2h7V6H14.4z";
    pub const WEBSITE: &str = "M12,2C6.5,2,2,6.5,2,12s4.5,10,10,10s10-4.5,10-10S17.5,2,12,2z M11,19.9c-3.9-0.5-7-3.9-7-7.9c0-0.6,0.1-1.2,0.2-1.8L9,15v1c0,1.1,0.9,2,2,2V19.9z M17.9,17.4c-0.3-0.8-1-1.4-1.9-1.4h-1v-3c0-0.6-0.4-1-1-1H8v-2h2c0.6,0,1-0.4,1-1V7h2c1.1,0,2-0.9,2-2V4.6c2.9,1.2,5,4.1,5,7.4C20,14.1,19.2,16,17.9,17.4z";
    pub const RANKING: &str = "M21.3,0H2.7C1.2,0,0,1.2,0,2.7v18.7C0,22.8,1.2,24,2.7,24h18.7c1.5,0,2.7-1.2,2.7-2.7V2.7C24,1.2,22.8,0,21.3,0z M21.3,21.3H2.7V2.7h18.7V21.3z M5.3,14.7h2.7v6.7H5.3V14.7z M10.7,10.7h2.7v10.7h-2.7V10.7z M16,5.3h2.7v16H16V5.3z";
    pub const FUNDING_TYPE: &str = "M12.52,10.53c-3-.78-4-1.6-4-2.86,0-1.46,1.35-2.47,3.6-2.47S15.37,6.33,15.45,8H18.4a5.31,5.31,0,0,0-4.28-5.08V0h-4V2.88c-2.59.56-4.67,2.24-4.67,4.81,0,3.08,2.55,4.62,6.27,5.51,3.33.8,4,2,4,3.21,0,.92-.65,2.39-3.6,2.39-2.75,0-3.83-1.23-4-2.8H5.21c.16,2.92,2.35,4.56,4.91,5.11V24h4V21.13c2.6-.49,4.67-2,4.67-4.73C18.79,12.61,15.55,11.32,12.52,10.53Z";
}

/// Fields addressed by a caption label, each with its own value element
/// type. A generic fallback would misread these; the value markup differs
/// per label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabeledField {
    FoundedDate,
    StockSymbol,
    LegalName,
    OperatingStatus,
}

impl LabeledField {
    pub fn label(self) -> &'static str {
        match self {
            LabeledField::FoundedDate => "Founded Date",
            LabeledField::StockSymbol => "Stock Symbol",
            LabeledField::LegalName => "Legal Name",
            LabeledField::OperatingStatus => "Operating Status",
        }
    }

    fn value_selector(self) -> &'static str {
        match self {
            LabeledField::FoundedDate => "span.field-type-date_precision",
            LabeledField::StockSymbol => "link-formatter a",
            LabeledField::LegalName => "blob-formatter span",
            LabeledField::OperatingStatus => "span.field-type-enum",
        }
    }
}

/// Find the list item containing the icon whose path definition starts
/// with the signature's first `ICON_PREFIX_LEN` characters.
fn icon_list_item<'a>(page: &'a Page, signature: &str) -> Option<ElementRef<'a>> {
    let prefix: String = signature.chars().take(ICON_PREFIX_LEN).collect();

    let icon = page.select("path").into_iter().find(|path| {
        path.value()
            .attr("d")
            .map(|d| d.starts_with(&prefix))
            .unwrap_or(false)
    })?;

    ancestor_with_tag(icon, "li", MAX_ANCESTOR_HOPS)
}

/// Icon-identity extraction: the first non-empty text-bearing span in the
/// icon's list item that is not itself the icon's accessibility label.
pub fn field_by_icon(page: &Page, signature: &str) -> Option<String> {
    let item = icon_list_item(page, signature)?;

    for span in select_within(item, "span") {
        let text = collapse_whitespace(&span.text().collect::<String>());
        if !text.is_empty() && !text.starts_with("svg") {
            return Some(text);
        }
    }

    debug!("Icon matched but its list item carries no text");
    None
}

/// The website field resolves a linked destination instead of display text.
pub fn link_href_by_icon(page: &Page, signature: &str) -> Option<String> {
    let item = icon_list_item(page, signature)?;
    select_within(item, "a")
        .into_iter()
        .find_map(|a| a.value().attr("href").map(str::to_string))
}

/// Label-adjacency extraction: find the smallest list item whose spans
/// mention both the first and last word of the label, then read the
/// label-specific value element. The title attribute is preferred over
/// visible text because tooltips carry the complete value.
pub fn field_by_label(page: &Page, field: LabeledField) -> Option<String> {
    let words: Vec<&str> = field.label().split_whitespace().collect();
    let (first_word, last_word) = (*words.first()?, *words.last()?);

    let matches: Vec<ElementRef<'_>> = page
        .select("li")
        .into_iter()
        .filter(|item| {
            let spans = select_within(*item, "span");
            let contains = |word: &str| {
                spans
                    .iter()
                    .any(|span| span.text().collect::<String>().contains(word))
            };
            contains(first_word) && contains(last_word)
        })
        .collect();

    // Prefer the innermost matching item: one that does not contain
    // another matching item in its subtree.
    let item = matches.iter().copied().find(|item| {
        !matches
            .iter()
            .any(|other| other.id() != item.id() && is_descendant(*other, *item))
    })?;

    let value = select_within(item, field.value_selector()).into_iter().next()?;
    element_value(value)
}

/// Numeric-by-label extraction: an integer-typed span next to an exact
/// label inside a clickable link. Non-digit or missing content is absence,
/// never a parse error.
pub fn numeric_by_label(page: &Page, label: &str) -> Option<u32> {
    let link = page.select("a").into_iter().find(|a| {
        select_within(*a, "span")
            .iter()
            .any(|span| span.text().collect::<String>().trim() == label)
    })?;

    let value = select_within(link, "span.field-type-integer")
        .into_iter()
        .next()?;
    let raw = element_value(value)?;

    if raw.chars().all(|c| c.is_ascii_digit()) {
        raw.parse().ok()
    } else {
        debug!("'{}' count is not numeric: '{}'", label, raw);
        None
    }
}

/// Company name from the profile heading, taking only direct text nodes so
/// badges and rank widgets nested inside the heading are excluded.
pub fn profile_name(page: &Page) -> Option<String> {
    let heading = page.select("h1.profile-name").into_iter().next()?;

    let mut name = String::new();
    for child in heading.children() {
        if let Node::Text(text) = child.value() {
            name.push_str(text);
        }
    }

    let name = name.trim().to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Free-text company description from the description card.
pub fn description(page: &Page) -> Option<String> {
    for selector in ["description-card .description", ".description"] {
        if let Some(element) = page.select(selector).into_iter().next() {
            let text = collapse_whitespace(&element.text().collect::<String>());
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Free-text funding summary from the financials page: the markup block
/// narrating what the company "has raised" in "total".
pub fn funding_summary(page: &Page) -> Option<String> {
    page.select("markup-block")
        .into_iter()
        .map(|block| collapse_whitespace(&block.text().collect::<String>()))
        .find(|text| text.contains("has raised") || text.contains("total of"))
}

/// Raw total-funding amount string. Tries the money-typed span inside the
/// info block labeled "Total Funding Amount" first, then falls back to any
/// money-typed span bearing a currency symbol.
pub fn funding_amount(page: &Page) -> Option<String> {
    let labeled = page
        .select("span")
        .into_iter()
        .filter(|span| {
            span.text()
                .collect::<String>()
                .contains("Total Funding Amount")
        })
        .find_map(|label| {
            let info = ancestor_div_with_class(label, "info")?;
            select_within(info, "span.field-type-money").into_iter().next()
        });

    let money = labeled.or_else(|| {
        page.select("span.field-type-money")
            .into_iter()
            .find(|span| {
                let text = span.text().collect::<String>();
                text.contains('$') || text.contains('¥')
            })
    })?;

    element_value(money)
}

/// Read an element's value: title attribute when present, visible text
/// otherwise. Empty values count as absent.
fn element_value(element: ElementRef<'_>) -> Option<String> {
    let value = match element.value().attr("title") {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        _ => collapse_whitespace(&element.text().collect::<String>()),
    };
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn ancestor_div_with_class<'a>(
    element: ElementRef<'a>,
    class_fragment: &str,
) -> Option<ElementRef<'a>> {
    let mut current = element;
    for _ in 0..MAX_ANCESTOR_HOPS {
        let parent = ElementRef::wrap(current.parent()?)?;
        if parent.value().name().eq_ignore_ascii_case("div")
            && parent
                .value()
                .attr("class")
                .map(|c| c.contains(class_fragment))
                .unwrap_or(false)
        {
            return Some(parent);
        }
        current = parent;
    }
    None
}

fn is_descendant(candidate: ElementRef<'_>, ancestor: ElementRef<'_>) -> bool {
    candidate.ancestors().any(|node| node.id() == ancestor.id())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}
