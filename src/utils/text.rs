//! Text Cleaning Helpers
//!
//! Normalization of the raw sheet values: training names carry embedded
//! session dates, company names carry legal suffixes, amounts arrive as
//! Dutch-formatted currency strings.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Dates in format dd/mm/yyyy or d/m/yyyy
    static ref SLASH_DATE: Regex = Regex::new(r"\s+\d{1,2}/\d{1,2}/\d{4}").unwrap();
    /// Dates in format dd-mm-yyyy or d-m-yyyy
    static ref DASH_DATE: Regex = Regex::new(r"\s+\d{1,2}-\d{1,2}-\d{4}").unwrap();
}

/// Legal suffixes stripped from company names (lowercase, with leading space)
const COMPANY_SUFFIXES: [&str; 6] = [" bv", " b.v.", " nv", " n.v.", " inc", " ltd"];

/// Remove embedded dates and collapse whitespace in a training name.
///
/// `"Green Belt Training 12/12/2024"` becomes `"Green Belt Training"`.
pub fn clean_training_name(raw: &str) -> String {
    let name = SLASH_DATE.replace_all(raw, "");
    let name = DASH_DATE.replace_all(&name, "");
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip legal suffixes and collapse whitespace in a company name.
///
/// `"ACME B.V."` becomes `"ACME"`.
pub fn clean_company_name(raw: &str) -> String {
    let mut name = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    for suffix in COMPANY_SUFFIXES {
        let lower = name.to_lowercase();
        if lower.ends_with(suffix) {
            name.truncate(name.len() - suffix.len());
        }
    }

    name.trim().to_string()
}

/// Flexible company/query matching: direct substring either way, then
/// word-wise matches.
///
/// The word pass compares whole words; substring-on-words would let common
/// Dutch fragments ("trainingen" contains "ing") hit unrelated companies.
pub fn company_matches_query(company_name: &str, query: &str) -> bool {
    let company = company_name.to_lowercase();
    let search = query.to_lowercase();

    if search.contains(&company) || company.contains(&search) {
        return true;
    }

    search
        .split_whitespace()
        .any(|sword| company.split_whitespace().any(|cword| sword == cword))
}

/// Parse a currency cell into euros.
///
/// Accepts both Dutch (`€ 1.234,56`) and English (`€1,234.56`) grouping; the
/// rightmost separator wins as the decimal mark when both are present.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');

    let normalized = match (last_dot, last_comma) {
        (Some(d), Some(c)) => {
            if c > d {
                // Dutch: '.' groups thousands, ',' is the decimal mark
                cleaned.replace('.', "").replace(',', ".")
            } else {
                // English: ',' groups thousands
                cleaned.replace(',', "")
            }
        }
        (None, Some(c)) => {
            // Lone comma: decimal mark when followed by 1-2 digits, grouping otherwise
            if cleaned.len() - c - 1 <= 2 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (Some(d), None) => {
            // Lone dot: same rule; "1.000" groups thousands, "950.00" does not
            if cleaned.len() - d - 1 <= 2 {
                cleaned
            } else {
                cleaned.replace('.', "")
            }
        }
        (None, None) => cleaned,
    };

    normalized.parse::<f64>().ok()
}

/// Format an amount the way the summaries print it: comma-grouped thousands,
/// two decimals (`1234.5` -> `"1,234.50"`).
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = format!("{:.2}", value.abs());
    let (int_part, dec_part) = rounded.split_once('.').unwrap_or((&rounded, "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-{}.{}", grouped, dec_part)
    } else {
        format!("{}.{}", grouped, dec_part)
    }
}

/// Parse a registration date cell (`d-m-Y`, `d/m/Y`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_training_name_slash_date() {
        assert_eq!(
            clean_training_name("Green Belt Training 12/12/2024"),
            "Green Belt Training"
        );
    }

    #[test]
    fn test_clean_training_name_dash_date() {
        assert_eq!(
            clean_training_name("Black Belt  1-3-2024  "),
            "Black Belt"
        );
    }

    #[test]
    fn test_clean_company_name() {
        assert_eq!(clean_company_name("ACME B.V."), "ACME");
        assert_eq!(clean_company_name("  Foo   Bar bv"), "Foo Bar");
        assert_eq!(clean_company_name("Plain"), "Plain");
    }

    #[test]
    fn test_company_matches_query() {
        assert!(company_matches_query("ING Bank Nederland", "omzet van ing"));
        assert!(company_matches_query("ACME", "acme trainingen"));
        assert!(!company_matches_query("ACME", "totale omzet 2024"));
    }

    #[test]
    fn test_company_word_match_needs_whole_words() {
        assert!(!company_matches_query("ING Bank", "alle trainingen"));
        assert!(company_matches_query("ING Bank", "exporteer ing van 2024"));
    }

    #[test]
    fn test_parse_amount_dutch() {
        assert_eq!(parse_amount("€ 1.234,56"), Some(1234.56));
        assert_eq!(parse_amount("€1.000"), Some(1000.0));
    }

    #[test]
    fn test_parse_amount_english() {
        assert_eq!(parse_amount("€1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("950.00"), Some(950.0));
    }

    #[test]
    fn test_parse_amount_lone_comma() {
        assert_eq!(parse_amount("12,5"), Some(12.5));
        assert_eq!(parse_amount("1,250"), Some(1250.0));
    }

    #[test]
    fn test_parse_amount_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n.v.t."), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(1_000_000.0), "1,000,000.00");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("01-03-2024"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(
            parse_date("1/3/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_date("maart 2024"), None);
    }
}
