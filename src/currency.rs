//! Currency amount parsing and shorthand formatting.
//!
//! Amounts on the profile page arrive as heterogeneous strings such as
//! "$1.5M", "CN¥100K" or "€2,300,000". Parsing detects the leading currency
//! symbol (longest symbol first, so "CN¥" is never shadowed by "¥"), strips
//! thousands separators, applies the K/M/B magnitude suffix, and converts
//! into the target currency using the configured rate table. Any failure,
//! including a missing conversion rate, yields absence: callers must never
//! receive a number in the wrong currency.

use std::collections::HashMap;
use tracing::{debug, warn};

/// Currency symbol to ISO code table. Longer symbols are listed first and
/// matching walks the table in order, so a multi-character symbol always
/// wins over its one-character prefix.
const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("CN¥", "CNY"),
    ("HK$", "HKD"),
    ("A$", "AUD"),
    ("C$", "CAD"),
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₹", "INR"),
    ("₣", "CHF"),
];

/// Trailing magnitude suffixes.
const MAGNITUDE_SUFFIXES: &[(&str, f64)] = &[
    ("K", 1_000.0),
    ("M", 1_000_000.0),
    ("B", 1_000_000_000.0),
];

/// Sentinel strings the site renders for unknown amounts.
const ABSENT_SENTINELS: &[&str] = &["n/a", "unknown", "--"];

/// A detected (currency code, numeric magnitude) pair before conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAmount {
    pub currency: String,
    pub magnitude: f64,
}

/// Parses amount strings and converts them using a configured rate table.
#[derive(Debug, Clone)]
pub struct CurrencyParser {
    /// Units of each currency per 1 USD, keyed by lowercase ISO code.
    usd_rates: HashMap<String, f64>,
}

impl CurrencyParser {
    pub fn new(usd_rates: HashMap<String, f64>) -> Self {
        let usd_rates = usd_rates
            .into_iter()
            .map(|(code, rate)| (code.to_lowercase(), rate))
            .collect();
        Self { usd_rates }
    }

    /// Parse an amount string into a value in `target_currency`.
    ///
    /// Returns `None` for empty input, sentinel strings, non-numeric
    /// residue, or when a needed conversion rate is not configured.
    pub fn parse_amount(&self, text: &str, target_currency: &str) -> Option<f64> {
        let parsed = parse_raw_amount(text)?;

        if parsed.currency.eq_ignore_ascii_case(target_currency) {
            return Some(parsed.magnitude);
        }

        match self.convert(parsed.magnitude, &parsed.currency, target_currency) {
            Some(converted) => Some(converted),
            None => {
                warn!(
                    "No conversion rate for {} -> {}, dropping amount '{}'",
                    parsed.currency, target_currency, text
                );
                None
            }
        }
    }

    /// Convert between two configured currencies, routing through USD.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        let from_rate = self.usd_rates.get(&from.to_lowercase())?;
        let to_rate = self.usd_rates.get(&to.to_lowercase())?;
        if *from_rate == 0.0 {
            return None;
        }
        Some(amount / from_rate * to_rate)
    }
}

/// Detect the leading currency symbol. Defaults to USD when no symbol in
/// the table matches. Returns the code and the remainder of the string.
pub fn detect_currency(text: &str) -> (&'static str, &str) {
    let text = text.trim();
    for (symbol, code) in CURRENCY_SYMBOLS {
        if let Some(rest) = text.strip_prefix(symbol) {
            return (code, rest.trim_start());
        }
    }
    ("USD", text)
}

/// Parse a raw amount string into (currency, magnitude) without conversion.
pub fn parse_raw_amount(text: &str) -> Option<ParsedAmount> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    if ABSENT_SENTINELS.contains(&lower.as_str()) {
        return None;
    }

    let (currency, rest) = detect_currency(text);
    let mut cleaned = rest.replace(',', "").trim().to_string();

    let mut multiplier = 1.0;
    for (suffix, mult) in MAGNITUDE_SUFFIXES {
        if let Some(stripped) = cleaned.strip_suffix(suffix) {
            multiplier = *mult;
            cleaned = stripped.trim().to_string();
            break;
        }
    }

    let magnitude: f64 = match cleaned.parse() {
        Ok(value) => value,
        Err(_) => {
            debug!("Could not parse amount '{}': non-numeric residue '{}'", text, cleaned);
            return None;
        }
    };

    Some(ParsedAmount {
        currency: currency.to_string(),
        magnitude: magnitude * multiplier,
    })
}

/// Render a magnitude back into K/M/B shorthand with one decimal place.
/// Values under 1,000 render as a rounded integer; absence renders empty.
pub fn format_amount(value: Option<f64>) -> String {
    let Some(amount) = value else {
        return String::new();
    };

    if amount >= 1_000_000_000.0 {
        format!("{:.1}B", amount / 1_000_000_000.0)
    } else if amount >= 1_000_000.0 {
        format!("{:.1}M", amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("{:.1}K", amount / 1_000.0)
    } else {
        format!("{:.0}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> CurrencyParser {
        let mut rates = HashMap::new();
        rates.insert("usd".to_string(), 1.0);
        rates.insert("cny".to_string(), 7.25);
        rates.insert("eur".to_string(), 0.92);
        CurrencyParser::new(rates)
    }

    #[test]
    fn test_parse_usd_passthrough() {
        let p = parser();
        assert_eq!(p.parse_amount("$1.5M", "USD"), Some(1_500_000.0));
        assert_eq!(p.parse_amount("$500", "USD"), Some(500.0));
        assert_eq!(p.parse_amount("$2,300,000", "USD"), Some(2_300_000.0));
    }

    #[test]
    fn test_parse_cny_converts_with_configured_rate() {
        let p = parser();
        let value = p.parse_amount("CN¥100K", "USD").unwrap();
        // 100,000 CNY at 7.25 per USD
        assert!((value - 100_000.0 / 7.25).abs() < 0.01);
        assert!(value > 0.0 && value.is_finite());
    }

    #[test]
    fn test_longest_symbol_wins() {
        // "CN¥" must not be parsed as generic "¥" (JPY)
        let (code, rest) = detect_currency("CN¥100K");
        assert_eq!(code, "CNY");
        assert_eq!(rest, "100K");

        let (code, _) = detect_currency("¥100K");
        assert_eq!(code, "JPY");

        let (code, _) = detect_currency("HK$5M");
        assert_eq!(code, "HKD");
    }

    #[test]
    fn test_no_symbol_defaults_to_usd() {
        let (code, rest) = detect_currency("750K");
        assert_eq!(code, "USD");
        assert_eq!(rest, "750K");
    }

    #[test]
    fn test_sentinels_and_garbage_are_absent() {
        let p = parser();
        assert_eq!(p.parse_amount("", "USD"), None);
        assert_eq!(p.parse_amount("n/a", "USD"), None);
        assert_eq!(p.parse_amount("N/A", "USD"), None);
        assert_eq!(p.parse_amount("unknown", "USD"), None);
        assert_eq!(p.parse_amount("--", "USD"), None);
        assert_eq!(p.parse_amount("abc", "USD"), None);
        assert_eq!(p.parse_amount("$abcM", "USD"), None);
    }

    #[test]
    fn test_missing_rate_is_absent_not_unconverted() {
        let p = parser();
        // INR symbol is recognized but no rate is configured
        assert_eq!(p.parse_amount("₹500K", "USD"), None);
    }

    #[test]
    fn test_suffix_multipliers() {
        assert_eq!(
            parse_raw_amount("$1.5B"),
            Some(ParsedAmount { currency: "USD".to_string(), magnitude: 1_500_000_000.0 })
        );
        assert_eq!(
            parse_raw_amount("€12K"),
            Some(ParsedAmount { currency: "EUR".to_string(), magnitude: 12_000.0 })
        );
    }

    #[test]
    fn test_format_amount_shorthand() {
        assert_eq!(format_amount(Some(1_500_000_000.0)), "1.5B");
        assert_eq!(format_amount(Some(1_500_000.0)), "1.5M");
        assert_eq!(format_amount(Some(12_000.0)), "12.0K");
        assert_eq!(format_amount(Some(500.0)), "500");
        assert_eq!(format_amount(None), "");
    }

    #[test]
    fn test_convert_routes_through_usd() {
        let p = parser();
        let usd = p.convert(725.0, "CNY", "USD").unwrap();
        assert!((usd - 100.0).abs() < 0.001);
        let eur = p.convert(100.0, "USD", "EUR").unwrap();
        assert!((eur - 92.0).abs() < 0.001);
    }
}
