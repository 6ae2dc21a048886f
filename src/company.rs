//! Company profile data model.
//!
//! A `CompanyRecord` is created once per successfully matched company page
//! and filled in field by field during extraction. Every field except the
//! name is optional: an absent field means the extractor found nothing,
//! which is distinct from a parsed zero or an empty string.

use serde::Serialize;

/// One scraped company profile.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyRecord {
    pub name: String,
    pub about: Option<String>,
    pub total_funding_usd: Option<f64>,
    pub total_funding_cny: Option<f64>,
    pub funding_info: Option<String>,
    pub last_funding_type: Option<String>,
    pub location: Option<String>,
    /// Headcount bucket as displayed on the page, e.g. "11-50".
    pub employee_count: Option<String>,
    /// "Public" or "Private".
    pub company_type: Option<String>,
    pub website: Option<String>,
    pub year_founded: Option<i32>,
    pub ranking: Option<u32>,
    pub acquisitions_count: Option<u32>,
    pub investments_count: Option<u32>,
    pub exits_count: Option<u32>,
    pub stock_symbol: Option<String>,
    pub legal_name: Option<String>,
    pub operating_status: Option<String>,
}

impl CompanyRecord {
    /// A record always starts from a resolved name; everything else is
    /// absent until an extractor fills it in.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            total_funding_usd: None,
            total_funding_cny: None,
            funding_info: None,
            last_funding_type: None,
            location: None,
            employee_count: None,
            company_type: None,
            website: None,
            year_founded: None,
            ranking: None,
            acquisitions_count: None,
            investments_count: None,
            exits_count: None,
            stock_symbol: None,
            legal_name: None,
            operating_status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_only_name() {
        let record = CompanyRecord::new("Acme");
        assert_eq!(record.name, "Acme");
        assert!(record.year_founded.is_none());
        assert!(record.total_funding_usd.is_none());
        assert!(record.employee_count.is_none());
    }
}
