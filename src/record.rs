//! Core record types: input rows, directory records, enriched results,
//! and per-field statistics.
//!
//! `EnrichedResult` keeps the mixed field naming of the existing output
//! schema (`companyName`/`matchType`/`originalData` camelCase next to
//! `linkedin_url`/`hq` snake_case) because a presentation layer outside
//! this crate consumes it verbatim.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A raw input row: column header to optional value, arbitrary headers
/// permitted. Header-to-canonical-key mapping happens upstream.
pub type InputRow = BTreeMap<String, Option<String>>;

/// The fixed set of output fields tracked for provenance and statistics.
pub const TRACKED_FIELDS: &[&str] = &[
    "companyName",
    "domain",
    "country",
    "industry",
    "subindustry",
    "hq",
    "size",
    "linkedin_url",
];

/// An internal company entity, the primary source of truth for matching.
///
/// `domain` is the unique key and is stored lowercase. `size` is kept as
/// the raw string it was loaded with (integer or range label); size
/// comparisons parse it on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    /// Display name.
    pub name: Option<String>,
    /// Unique lowercase domain key.
    pub domain: String,
    /// Countries of operation, ordered, first is primary.
    pub countries: Vec<String>,
    /// Headquarters location.
    pub hq: Option<String>,
    /// Top-level industry.
    pub industry: Option<String>,
    /// Subindustry.
    pub subindustry: Option<String>,
    /// Contextual keywords.
    pub keywords: Vec<String>,
    /// Employee size, integer or range label.
    pub size: Option<String>,
    /// LinkedIn company page URL.
    pub linkedin_url: Option<String>,
    /// LinkedIn slug, when known.
    pub slug: Option<String>,
    /// Name as originally ingested.
    pub original_name: Option<String>,
    /// Registered legal name.
    pub legal_name: Option<String>,
}

impl DirectoryRecord {
    /// Creates a record keyed by `domain` (stored lowercase).
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into().trim().to_lowercase(),
            ..Self::default()
        }
    }
}

/// How a row was resolved, one variant per combination of identifying
/// signals that contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Tier 1: exact domain equality.
    Exact,
    /// Tier 2: LinkedIn slug equality, no domain in the input.
    #[serde(rename = "LinkedInURL")]
    LinkedInUrl,
    /// Tier 2: slug equality after an input domain missed tier 1.
    #[serde(rename = "Domain+LinkedInURL")]
    DomainLinkedInUrl,
    /// Tier 3: name + attribute filters, name was the only signal.
    CompanyName,
    /// Tier 3 hit with a domain also present in the input.
    #[serde(rename = "Domain+CompanyName")]
    DomainCompanyName,
    /// Tier 3 hit with a LinkedIn URL also present in the input.
    #[serde(rename = "LinkedInURL+CompanyName")]
    LinkedInUrlCompanyName,
    /// Resolved by the AI fallback.
    #[serde(rename = "AI")]
    Ai,
    /// No tier produced a record and the fallback did not resolve it.
    None,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exact => "Exact",
            Self::LinkedInUrl => "LinkedInURL",
            Self::DomainLinkedInUrl => "Domain+LinkedInURL",
            Self::CompanyName => "CompanyName",
            Self::DomainCompanyName => "Domain+CompanyName",
            Self::LinkedInUrlCompanyName => "LinkedInURL+CompanyName",
            Self::Ai => "AI",
            Self::None => "None",
        };
        f.write_str(s)
    }
}

impl MatchType {
    /// True for any internal-directory resolution tier.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        !matches!(self, Self::Ai | Self::None)
    }
}

/// Confidence level of a resolved row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    /// Resolved via the directory or the AI fallback.
    High,
    /// Unresolved.
    Low,
}

/// Origin of an output field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// The internal company directory.
    Internal,
    /// The AI fallback service.
    Ai,
}

/// Per-row enrichment output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedResult {
    /// 1-based input row index.
    pub id: usize,
    /// Resolved company name.
    #[serde(rename = "companyName")]
    pub company_name: String,
    /// The verbatim input row, regardless of match outcome.
    #[serde(rename = "originalData")]
    pub original_data: InputRow,
    /// Resolved domain.
    pub domain: String,
    /// Resolved primary country.
    pub country: String,
    /// Resolved industry.
    pub industry: String,
    /// Resolved subindustry.
    pub subindustry: Option<String>,
    /// Resolved headquarters.
    pub hq: Option<String>,
    /// Resolved employee size.
    pub size: Option<String>,
    /// Resolved LinkedIn URL.
    pub linkedin_url: Option<String>,
    /// Confidence level.
    pub confidence: Confidence,
    /// How the row was resolved.
    #[serde(rename = "matchType")]
    pub match_type: MatchType,
    /// Failure reason when unresolved.
    pub notes: Option<String>,
    /// Field name to provenance, for fields filled from a real source.
    pub sources: BTreeMap<String, Provenance>,
}

impl EnrichedResult {
    /// Yields `(field, populated)` for every tracked output field.
    fn tracked_values(&self) -> [(&'static str, bool); 8] {
        let some_nonempty =
            |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        [
            ("companyName", !self.company_name.trim().is_empty()),
            ("domain", !self.domain.trim().is_empty()),
            ("country", !self.country.trim().is_empty()),
            ("industry", !self.industry.trim().is_empty()),
            ("subindustry", some_nonempty(&self.subindustry)),
            ("hq", some_nonempty(&self.hq)),
            ("size", some_nonempty(&self.size)),
            ("linkedin_url", some_nonempty(&self.linkedin_url)),
        ]
    }
}

/// Counters for a single output field, accumulated across a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStat {
    /// Rows where this field was populated from a source.
    pub enriched: u64,
    /// Of those, how many came from the internal directory.
    pub internal: u64,
    /// Of those, how many came from the AI fallback.
    pub ai: u64,
}

/// Per-field statistics over the fixed output field set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    fields: BTreeMap<String, FieldStat>,
}

impl FieldStats {
    /// Empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates one resolved row.
    ///
    /// A field counts when it is populated and carries a provenance entry;
    /// `enriched` stays equal to `internal + ai` for every field.
    pub fn record(&mut self, result: &EnrichedResult) {
        for (field, populated) in result.tracked_values() {
            if !populated {
                continue;
            }
            let Some(provenance) = result.sources.get(field) else {
                continue;
            };
            let stat = self.fields.entry(field.to_string()).or_default();
            stat.enriched += 1;
            match provenance {
                Provenance::Internal => stat.internal += 1,
                Provenance::Ai => stat.ai += 1,
            }
        }
    }

    /// Counter for one field, zeroed when never seen.
    #[must_use]
    pub fn get(&self, field: &str) -> FieldStat {
        self.fields.get(field).copied().unwrap_or_default()
    }

    /// Total internally sourced field values across all fields.
    #[must_use]
    pub fn internal_total(&self) -> u64 {
        self.fields.values().map(|s| s.internal).sum()
    }

    /// Total AI-sourced field values across all fields.
    #[must_use]
    pub fn ai_total(&self) -> u64 {
        self.fields.values().map(|s| s.ai).sum()
    }

    /// Iterates `(field, stat)` in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldStat)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_sources(sources: &[(&str, Provenance)]) -> EnrichedResult {
        EnrichedResult {
            id: 1,
            company_name: "Acme".to_string(),
            original_data: InputRow::new(),
            domain: "acme.com".to_string(),
            country: "US".to_string(),
            industry: String::new(),
            subindustry: None,
            hq: None,
            size: None,
            linkedin_url: None,
            confidence: Confidence::High,
            match_type: MatchType::Exact,
            notes: None,
            sources: sources
                .iter()
                .map(|(k, v)| ((*k).to_string(), *v))
                .collect(),
        }
    }

    #[test]
    fn test_match_type_serialization() {
        let cases = [
            (MatchType::Exact, "\"Exact\""),
            (MatchType::LinkedInUrl, "\"LinkedInURL\""),
            (MatchType::DomainLinkedInUrl, "\"Domain+LinkedInURL\""),
            (MatchType::DomainCompanyName, "\"Domain+CompanyName\""),
            (MatchType::Ai, "\"AI\""),
            (MatchType::None, "\"None\""),
        ];
        for (mt, expected) in cases {
            assert_eq!(serde_json::to_string(&mt).unwrap(), expected);
            assert_eq!(format!("\"{mt}\""), expected);
        }
    }

    #[test]
    fn test_result_serialization_field_names() {
        let result = result_with_sources(&[("companyName", Provenance::Internal)]);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("companyName").is_some());
        assert!(json.get("matchType").is_some());
        assert!(json.get("originalData").is_some());
        assert!(json.get("linkedin_url").is_some());
        assert_eq!(json["sources"]["companyName"], "internal");
    }

    #[test]
    fn test_field_stats_count_only_sourced_fields() {
        let mut stats = FieldStats::new();
        // companyName/domain sourced internally; country populated but
        // unsourced, so it must not count.
        let result = result_with_sources(&[
            ("companyName", Provenance::Internal),
            ("domain", Provenance::Internal),
        ]);
        stats.record(&result);

        assert_eq!(stats.get("companyName").enriched, 1);
        assert_eq!(stats.get("companyName").internal, 1);
        assert_eq!(stats.get("companyName").ai, 0);
        assert_eq!(stats.get("country").enriched, 0);
        assert_eq!(stats.internal_total(), 2);
        assert_eq!(stats.ai_total(), 0);
    }

    #[test]
    fn test_field_stats_ai_counters() {
        let mut stats = FieldStats::new();
        let result = result_with_sources(&[
            ("companyName", Provenance::Ai),
            ("domain", Provenance::Ai),
            ("country", Provenance::Ai),
        ]);
        stats.record(&result);
        stats.record(&result);

        assert_eq!(stats.get("country").ai, 2);
        assert_eq!(stats.ai_total(), 6);
        for (_, stat) in stats.iter() {
            assert_eq!(stat.enriched, stat.internal + stat.ai);
        }
    }

    #[test]
    fn test_directory_record_lowercases_domain() {
        let record = DirectoryRecord::new(" Acme.COM ");
        assert_eq!(record.domain, "acme.com");
    }
}
