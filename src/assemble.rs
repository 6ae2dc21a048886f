//! Record assembly: runs the extractor manifest against a company page.
//!
//! The name is the only mandatory field; everything else is best-effort
//! and an extractor that finds nothing simply leaves its field absent.
//! One ordering dependency exists: the funding summary lives on the
//! financials sub-page, so assembly navigates there and restores the
//! original page afterward. Navigation failures are transport errors and
//! abort the company; field lookups on a loaded page never do.

use tracing::{debug, warn};

use crate::company::CompanyRecord;
use crate::currency::CurrencyParser;
use crate::extract::{self, icons, LabeledField};
use crate::page::{PageError, PageSource};

pub struct RecordAssembler {
    financials_segment: String,
    currency: CurrencyParser,
}

impl RecordAssembler {
    pub fn new(financials_segment: impl Into<String>, currency: CurrencyParser) -> Self {
        Self {
            financials_segment: financials_segment.into(),
            currency,
        }
    }

    /// Assemble a record from the company page at `company_url`.
    ///
    /// Returns `Ok(None)` when no company name is resolvable on the page;
    /// `Err` only for transport failures.
    pub fn assemble<S: PageSource>(
        &self,
        source: &mut S,
        company_url: &str,
    ) -> Result<Option<CompanyRecord>, PageError> {
        let page = source.goto(company_url)?;

        let Some(name) = extract::profile_name(&page) else {
            warn!("No company name found on {}", page.url());
            return Ok(None);
        };
        debug!("Assembling record for '{}'", name);
        let mut record = CompanyRecord::new(name);

        record.about = extract::description(&page);

        // Icon-addressed fields.
        record.location = extract::field_by_icon(&page, icons::LOCATION);
        record.employee_count = extract::field_by_icon(&page, icons::EMPLOYEES);
        record.company_type = extract::field_by_icon(&page, icons::COMPANY_TYPE);
        record.last_funding_type = extract::field_by_icon(&page, icons::FUNDING_TYPE);
        // The website field wants the link target, with display text as a
        // fallback when the list item carries no anchor.
        record.website = extract::link_href_by_icon(&page, icons::WEBSITE)
            .or_else(|| extract::field_by_icon(&page, icons::WEBSITE));
        record.ranking = extract::field_by_icon(&page, icons::RANKING)
            .filter(|text| !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()))
            .and_then(|text| text.parse().ok());

        // Counter links.
        record.acquisitions_count = extract::numeric_by_label(&page, "Acquisitions");
        record.investments_count = extract::numeric_by_label(&page, "Investments");
        record.exits_count = extract::numeric_by_label(&page, "Exits");

        // Label-addressed fields. The founded year is derived from the
        // trailing year token of the full date string.
        match extract::field_by_label(&page, LabeledField::FoundedDate) {
            Some(date) => {
                record.year_founded = parse_trailing_year(&date);
                if record.year_founded.is_none() {
                    warn!("Couldn't parse founded date: {}", date);
                }
            }
            None => debug!("Founded Date: not found"),
        }
        record.stock_symbol = extract::field_by_label(&page, LabeledField::StockSymbol);
        record.legal_name = extract::field_by_label(&page, LabeledField::LegalName);
        record.operating_status = extract::field_by_label(&page, LabeledField::OperatingStatus);

        // Funding amount: both output columns derive from the same raw
        // string; a failed conversion leaves that column absent rather
        // than carrying a wrong-currency number.
        if let Some(raw) = extract::funding_amount(&page) {
            debug!("Found raw funding amount: {}", raw);
            record.total_funding_usd = self.currency.parse_amount(&raw, "USD");
            record.total_funding_cny = self.currency.parse_amount(&raw, "CNY");
        }

        // The funding summary lives on the financials sub-page. Fetch it,
        // then restore the original page so callers see where they were.
        let profile_url = page.url().to_string();
        let financials_url = join_segment(&profile_url, &self.financials_segment);
        let financials = source.goto(&financials_url)?;
        record.funding_info = extract::funding_summary(&financials);
        source.goto(&profile_url)?;

        Ok(Some(record))
    }
}

/// Parse the trailing year token out of a date string like "Jan 1, 2015".
fn parse_trailing_year(date: &str) -> Option<i32> {
    date.split(',').next_back()?.trim().parse().ok()
}

/// Append a path segment to a URL, tolerating a trailing slash.
fn join_segment(url: &str, segment: &str) -> String {
    format!("{}{}", url.trim_end_matches('/'), segment)
}
