//! Input canonicalization: company names, domains, LinkedIn URLs, and
//! employee sizes.
//!
//! Every function in this module is total and deterministic. Absent or
//! malformed input yields an empty/`None` result, never an error, so the
//! normalizer can run unguarded over arbitrary uploaded rows.

use serde::{Deserialize, Serialize};
use url::Url;

/// Known corporate suffixes, lowercase with punctuation stripped.
/// Two-token suffixes ("pvt ltd") are matched before single tokens.
const LEGAL_SUFFIXES: &[&str] = &[
    "llc", "inc", "corp", "ltd", "pvt ltd", "plc", "sa", "ag", "gmbh", "co", "company", "llp",
    "limited",
];

/// Inclusive employee-count bucket boundaries and their display labels.
const SIZE_BUCKETS: &[(u64, u64, &str)] = &[
    (0, 10, "1-10"),
    (11, 50, "11-50"),
    (51, 200, "51-200"),
    (201, 500, "201-500"),
    (501, 1000, "501-1,000"),
    (1001, 5000, "1,001-5,000"),
    (5001, 10000, "5,001-10,000"),
];

const TOP_BUCKET_LABEL: &str = "10,001+";

/// Lowercases a token and strips everything that is not an ASCII letter,
/// so "S.A." and "sa" compare equal.
fn clean_suffix_token(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_lowercase)
        .collect()
}

/// Removes known legal suffixes from the end of a company name.
///
/// Suffixes are stripped token-by-token from the end, including two-token
/// forms, stopping at the first non-suffix token. Original casing and
/// internal punctuation are preserved.
#[must_use]
pub fn strip_legal_suffixes(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    while let Some(last) = tokens.last() {
        let token_clean = clean_suffix_token(last);
        if token_clean.is_empty() {
            tokens.pop();
            continue;
        }
        if tokens.len() >= 2 {
            let two_token_clean = format!(
                "{} {}",
                clean_suffix_token(tokens[tokens.len() - 2]),
                token_clean
            );
            if LEGAL_SUFFIXES.contains(&two_token_clean.as_str()) {
                tokens.pop();
                tokens.pop();
                continue;
            }
        }
        if LEGAL_SUFFIXES.contains(&token_clean.as_str()) {
            tokens.pop();
            continue;
        }
        break;
    }
    tokens.join(" ")
}

/// Normalizes a company name by stripping trailing legal suffixes.
///
/// Idempotent: normalizing an already-normalized name is a no-op.
/// Comparisons against normalized names are case-insensitive throughout
/// the matcher; the name itself keeps its original casing.
#[must_use]
pub fn normalize_company_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    strip_legal_suffixes(trimmed)
}

/// Parses a raw URL-ish string, prepending `http://` when no scheme is
/// present so bare hosts like `acme.com/about` still parse.
fn parse_lenient(raw: &str) -> Option<Url> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    Url::parse(&candidate).ok()
}

/// Normalizes a domain to its bare lowercase host.
///
/// Strips scheme, `www.` prefix, port, path, query, and fragment.
/// Unparseable input degrades to a best-effort string strip; empty input
/// yields an empty string.
#[must_use]
pub fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim().to_lowercase();
    if trimmed.is_empty() {
        return String::new();
    }

    let host = match parse_lenient(&trimmed) {
        Some(url) => url.host_str().unwrap_or_default().to_string(),
        None => {
            let after_scheme = trimmed.rsplit("://").next().unwrap_or("");
            after_scheme
                .split(['/', ':', '?', '#'])
                .next()
                .unwrap_or("")
                .to_string()
        }
    };

    host.strip_prefix("www.").map_or(host.clone(), str::to_string)
}

/// Extracts a LinkedIn company slug from a URL.
///
/// Returns the lowercase path segment following `/company/`. When no such
/// segment exists the stripped path is returned as a best-effort slug.
#[must_use]
pub fn extract_linkedin_slug(raw: &str) -> String {
    let trimmed = raw.trim().to_lowercase();
    if trimmed.is_empty() {
        return String::new();
    }

    let path = match parse_lenient(&trimmed) {
        Some(url) => url.path().to_string(),
        None => trimmed.clone(),
    };
    let path = path.trim_matches('/');
    if path.is_empty() {
        return String::new();
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if let Some(pos) = segments.iter().position(|s| *s == "company") {
        if let Some(slug) = segments.get(pos + 1) {
            return (*slug).to_string();
        }
    }
    path.to_string()
}

/// Parsed employee size: an exact headcount, a bucket label, or both.
///
/// Purely numeric input (thousands separators tolerated) yields an exact
/// count plus its derived bucket; anything else is treated as a bucket
/// label directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSize {
    /// Exact headcount, when the raw value was numeric.
    pub count: Option<u64>,
    /// Bucket label, derived from the count or taken verbatim.
    pub bucket: Option<String>,
}

impl EmployeeSize {
    /// True when neither a count nor a bucket was recoverable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count.is_none() && self.bucket.is_none()
    }

    /// A stable string form used in identity tuples.
    #[must_use]
    pub fn identity_key(&self) -> String {
        match (self.count, &self.bucket) {
            (Some(n), _) => n.to_string(),
            (None, Some(b)) => b.to_lowercase(),
            (None, None) => String::new(),
        }
    }
}

/// Returns the display label for the bucket containing `count`.
#[must_use]
pub fn size_bucket_label(count: u64) -> &'static str {
    for (lo, hi, label) in SIZE_BUCKETS {
        if count >= *lo && count <= *hi {
            return label;
        }
    }
    TOP_BUCKET_LABEL
}

/// Parses a raw employee-size string.
#[must_use]
pub fn parse_employee_size(raw: &str) -> EmployeeSize {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return EmployeeSize::default();
    }

    let digits: String = trimmed.chars().filter(|c| !matches!(c, ',' | ' ')).collect();
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(count) = digits.parse::<u64>() {
            return EmployeeSize {
                count: Some(count),
                bucket: Some(size_bucket_label(count).to_string()),
            };
        }
    }

    EmployeeSize {
        count: None,
        bucket: Some(trimmed.to_string()),
    }
}

/// Splits a raw keyword field on commas/semicolons into trimmed lowercase
/// keywords, preserving order and dropping duplicates.
#[must_use]
pub fn normalize_keywords(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split([',', ';']) {
        let keyword = part.trim().to_lowercase();
        if !keyword.is_empty() && !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_company_name_suffixes() {
        let cases = [
            ("Apple Inc.", "Apple"),
            ("Google LLC", "Google"),
            ("Global Innovations pvt ltd", "Global Innovations"),
            ("Nestlé S.A.", "Nestlé"),
            ("Procter & Gamble", "Procter & Gamble"),
            ("A.P. Moller - Maersk", "A.P. Moller - Maersk"),
            ("The Coca-Cola Company", "The Coca-Cola"),
            ("Foo LLP.", "Foo"),
        ];
        for (original, expected) in cases {
            assert_eq!(normalize_company_name(original), expected, "{original}");
        }
    }

    #[test]
    fn test_normalize_company_name_idempotent() {
        for name in ["Apple Inc.", "The Coca-Cola Company", "Acme", ""] {
            let once = normalize_company_name(name);
            assert_eq!(normalize_company_name(&once), once);
        }
    }

    #[test]
    fn test_normalize_company_name_empty() {
        assert_eq!(normalize_company_name(""), "");
        assert_eq!(normalize_company_name("   "), "");
    }

    #[test]
    fn test_normalize_domain_strips_scheme_www_path() {
        assert_eq!(normalize_domain("https://www.google.com/path"), "google.com");
        assert_eq!(normalize_domain("http://acme.io"), "acme.io");
        assert_eq!(normalize_domain("WWW.Example.COM"), "example.com");
        assert_eq!(normalize_domain("example.com:8080/x?q=1"), "example.com");
        assert_eq!(normalize_domain("  acme.com  "), "acme.com");
        assert_eq!(normalize_domain(""), "");
    }

    #[test]
    fn test_extract_linkedin_slug() {
        assert_eq!(
            extract_linkedin_slug("https://linkedin.com/company/aiexample"),
            "aiexample"
        );
        assert_eq!(
            extract_linkedin_slug("https://www.linkedin.com/company/Acme-Corp/about/"),
            "acme-corp"
        );
        assert_eq!(extract_linkedin_slug("linkedin.com/in/somebody"), "in/somebody");
        assert_eq!(extract_linkedin_slug(""), "");
    }

    #[test]
    fn test_parse_employee_size_numeric() {
        let size = parse_employee_size("1,250");
        assert_eq!(size.count, Some(1250));
        assert_eq!(size.bucket.as_deref(), Some("1,001-5,000"));

        let size = parse_employee_size("7");
        assert_eq!(size.count, Some(7));
        assert_eq!(size.bucket.as_deref(), Some("1-10"));

        let size = parse_employee_size("50000");
        assert_eq!(size.bucket.as_deref(), Some("10,001+"));
    }

    #[test]
    fn test_parse_employee_size_bucket_passthrough() {
        let size = parse_employee_size("201-500");
        assert_eq!(size.count, None);
        assert_eq!(size.bucket.as_deref(), Some("201-500"));

        assert!(parse_employee_size("").is_empty());
        assert!(parse_employee_size("  ").is_empty());
    }

    #[test]
    fn test_size_bucket_boundaries() {
        assert_eq!(size_bucket_label(10), "1-10");
        assert_eq!(size_bucket_label(11), "11-50");
        assert_eq!(size_bucket_label(200), "51-200");
        assert_eq!(size_bucket_label(501), "501-1,000");
        assert_eq!(size_bucket_label(10000), "5,001-10,000");
        assert_eq!(size_bucket_label(10001), "10,001+");
    }

    #[test]
    fn test_employee_size_serde_round_trip() {
        let size = parse_employee_size("1,250");
        let json = serde_json::to_value(&size).unwrap();
        assert_eq!(json["count"], 1250);
        assert_eq!(json["bucket"], "1,001-5,000");
        let back: EmployeeSize = serde_json::from_value(json).unwrap();
        assert_eq!(back, size);
    }

    #[test]
    fn test_normalize_keywords() {
        assert_eq!(
            normalize_keywords("Cloud, Security; cloud ,AI"),
            vec!["cloud", "security", "ai"]
        );
        assert!(normalize_keywords("").is_empty());
    }
}
