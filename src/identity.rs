//! Derivation of a [`NormalizedIdentity`] from a raw input row.

use serde::{Deserialize, Serialize};

use crate::normalize::{
    extract_linkedin_slug, normalize_company_name, normalize_domain, normalize_keywords,
    parse_employee_size, EmployeeSize,
};
use crate::record::InputRow;
use crate::reference::{normalize_country, normalize_industry, normalize_subindustry};

/// Canonical column headers recognized by identity extraction. Upstream
/// column mapping is expected to have renamed arbitrary headers to these.
const HEADER_NAME: &str = "Company Name";
const HEADER_DOMAIN: &str = "Domain";
const HEADER_LINKEDIN: &str = "LinkedIn URL";
const HEADER_COUNTRY: &str = "Country";
const HEADER_INDUSTRY: &str = "Industry";
const HEADER_SUBINDUSTRY: &str = "Subindustry";
const HEADER_SIZE: &str = "Size";
const HEADER_KEYWORDS: &str = "Keywords";

/// Separator for identity tuple keys. Unit separator, cannot occur in
/// normalized field values.
const KEY_SEP: char = '\u{1f}';

/// The comparable form of one input row.
///
/// Derivation is pure and deterministic: the same row always yields the
/// same identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedIdentity {
    /// Company name with legal suffixes stripped, original casing kept.
    pub name: String,
    /// The name exactly as it appeared in the row.
    pub raw_name: String,
    /// Bare lowercase host, or empty.
    pub domain: String,
    /// LinkedIn company slug, or empty.
    pub linkedin_slug: String,
    /// The LinkedIn URL as it appeared in the row.
    pub linkedin_url: Option<String>,
    /// ISO alpha-2 country code, when resolvable.
    pub country: Option<String>,
    /// Canonical industry label, when the raw value maps to the taxonomy.
    pub industry: Option<String>,
    /// Canonical subindustry label, when mapped.
    pub subindustry: Option<String>,
    /// Parsed employee size.
    pub size: EmployeeSize,
    /// Normalized keywords, ordered, deduplicated.
    pub keywords: Vec<String>,
}

/// Fetches a non-empty trimmed value for a canonical header, comparing
/// headers trimmed and case-insensitively.
fn field<'a>(row: &'a InputRow, header: &str) -> Option<&'a str> {
    row.iter().find_map(|(key, value)| {
        if !key.trim().eq_ignore_ascii_case(header) {
            return None;
        }
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })
}

impl NormalizedIdentity {
    /// Derives the identity for one row. Total: malformed or absent
    /// fields yield empty/`None` components, never an error.
    #[must_use]
    pub fn from_row(row: &InputRow) -> Self {
        let raw_name = field(row, HEADER_NAME).unwrap_or_default().to_string();
        let linkedin_url = field(row, HEADER_LINKEDIN).map(str::to_string);

        Self {
            name: normalize_company_name(&raw_name),
            raw_name,
            domain: field(row, HEADER_DOMAIN).map(normalize_domain).unwrap_or_default(),
            linkedin_slug: linkedin_url
                .as_deref()
                .map(extract_linkedin_slug)
                .unwrap_or_default(),
            linkedin_url,
            country: field(row, HEADER_COUNTRY).and_then(normalize_country),
            industry: field(row, HEADER_INDUSTRY).and_then(normalize_industry),
            subindustry: field(row, HEADER_SUBINDUSTRY).and_then(normalize_subindustry),
            size: field(row, HEADER_SIZE).map(parse_employee_size).unwrap_or_default(),
            keywords: field(row, HEADER_KEYWORDS).map(normalize_keywords).unwrap_or_default(),
        }
    }

    /// True when the row carries at least one usable identifier.
    #[must_use]
    pub fn has_identifier(&self) -> bool {
        !self.name.is_empty() || !self.domain.is_empty() || !self.linkedin_slug.is_empty()
    }

    /// The full identity tuple key used by the preprocessing deduplicator:
    /// (name, country, industry, subindustry, size, keywords).
    #[must_use]
    pub fn identity_key(&self) -> String {
        let mut key = String::new();
        key.push_str(&self.name.to_lowercase());
        key.push(KEY_SEP);
        key.push_str(self.country.as_deref().unwrap_or(""));
        key.push(KEY_SEP);
        key.push_str(&self.industry.as_deref().unwrap_or("").to_lowercase());
        key.push(KEY_SEP);
        key.push_str(&self.subindustry.as_deref().unwrap_or("").to_lowercase());
        key.push(KEY_SEP);
        key.push_str(&self.size.identity_key());
        key.push(KEY_SEP);
        key.push_str(&self.keywords.join(","));
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> InputRow {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Some((*v).to_string())))
            .collect()
    }

    #[test]
    fn test_from_row_normalizes_all_fields() {
        let identity = NormalizedIdentity::from_row(&row(&[
            ("Company Name", "Acme Inc."),
            ("Domain", "https://www.acme.com/about"),
            ("LinkedIn URL", "https://linkedin.com/company/acme"),
            ("Country", "india"),
            ("Industry", "Technology"),
            ("Subindustry", "SaaS"),
            ("Size", "1,250"),
            ("Keywords", "Cloud, Security"),
        ]));

        assert_eq!(identity.name, "Acme");
        assert_eq!(identity.raw_name, "Acme Inc.");
        assert_eq!(identity.domain, "acme.com");
        assert_eq!(identity.linkedin_slug, "acme");
        assert_eq!(identity.country.as_deref(), Some("IN"));
        assert_eq!(identity.industry.as_deref(), Some("Technology"));
        assert_eq!(identity.subindustry.as_deref(), Some("SaaS"));
        assert_eq!(identity.size.count, Some(1250));
        assert_eq!(identity.keywords, vec!["cloud", "security"]);
        assert!(identity.has_identifier());
    }

    #[test]
    fn test_from_row_headers_trimmed_case_insensitive() {
        let identity =
            NormalizedIdentity::from_row(&row(&[("company name ", "Acme"), ("DOMAIN", "a.com")]));
        assert_eq!(identity.name, "Acme");
        assert_eq!(identity.domain, "a.com");
    }

    #[test]
    fn test_from_row_is_deterministic() {
        let r = row(&[("Company Name", "Acme Inc."), ("Country", "Germany")]);
        assert_eq!(NormalizedIdentity::from_row(&r), NormalizedIdentity::from_row(&r));
    }

    #[test]
    fn test_empty_row_has_no_identifier() {
        let mut r = InputRow::new();
        r.insert("Domain".to_string(), Some("  ".to_string()));
        r.insert("Company Name".to_string(), None);
        let identity = NormalizedIdentity::from_row(&r);
        assert!(!identity.has_identifier());
    }

    #[test]
    fn test_identity_key_is_name_insensitive_to_case() {
        let a = NormalizedIdentity::from_row(&row(&[("Company Name", "Acme Inc"), ("Size", "10")]));
        let b = NormalizedIdentity::from_row(&row(&[("Company Name", "ACME"), ("Size", "10")]));
        assert_eq!(a.identity_key(), b.identity_key());
    }
}
