//! Field resolution: merging an internal match or an AI record into the
//! unified output schema with per-field provenance.

use std::collections::BTreeMap;

use crate::ai::AiCompanyRecord;
use crate::identity::NormalizedIdentity;
use crate::matcher::MatchOutcome;
use crate::record::{Confidence, EnrichedResult, InputRow, MatchType, Provenance};

/// Collects `(field, value)` pairs into the output record, tagging each
/// populated field with `provenance`.
struct FieldWriter {
    provenance: Provenance,
    sources: BTreeMap<String, Provenance>,
}

impl FieldWriter {
    fn new(provenance: Provenance) -> Self {
        Self {
            provenance,
            sources: BTreeMap::new(),
        }
    }

    fn required(&mut self, field: &str, value: Option<&str>) -> String {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => {
                self.sources.insert(field.to_string(), self.provenance);
                v.to_string()
            }
            None => String::new(),
        }
    }

    fn optional(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let v = value.map(str::trim).filter(|v| !v.is_empty())?;
        self.sources.insert(field.to_string(), self.provenance);
        Some(v.to_string())
    }
}

/// Merges the match outcome, the optional AI record, and the original
/// row into one [`EnrichedResult`].
///
/// Internal hit: every populated field is tagged `internal`, confidence
/// High. AI hit: every populated field is tagged `ai`, confidence High,
/// match type `AI`. Otherwise confidence Low, no provenance, and the
/// output fields fall back to the raw input values. `original_data` is
/// always the verbatim input row.
#[must_use]
pub fn resolve_fields(
    id: usize,
    row: &InputRow,
    identity: &NormalizedIdentity,
    outcome: &MatchOutcome,
    ai: Option<&AiCompanyRecord>,
) -> EnrichedResult {
    if let Some(record) = outcome.record.as_ref() {
        let mut w = FieldWriter::new(Provenance::Internal);
        let company_name = w.required("companyName", record.name.as_deref());
        return EnrichedResult {
            id,
            company_name: if company_name.is_empty() {
                identity.raw_name.clone()
            } else {
                company_name
            },
            original_data: row.clone(),
            domain: w.required("domain", Some(record.domain.as_str())),
            country: w.required("country", record.countries.first().map(String::as_str)),
            industry: w.required("industry", record.industry.as_deref()),
            subindustry: w.optional("subindustry", record.subindustry.as_deref()),
            hq: w.optional("hq", record.hq.as_deref()),
            size: w.optional("size", record.size.as_deref()),
            linkedin_url: w.optional("linkedin_url", record.linkedin_url.as_deref()),
            confidence: Confidence::High,
            match_type: outcome.match_type,
            notes: None,
            sources: w.sources,
        };
    }

    if let Some(record) = ai {
        let mut w = FieldWriter::new(Provenance::Ai);
        let company_name = w.required("companyName", record.name.as_deref());
        return EnrichedResult {
            id,
            company_name: if company_name.is_empty() {
                identity.raw_name.clone()
            } else {
                company_name
            },
            original_data: row.clone(),
            domain: w.required("domain", record.domain.as_deref()),
            country: w.required("country", record.countries.first().map(String::as_str)),
            industry: w.required("industry", record.industry.as_deref()),
            subindustry: w.optional("subindustry", record.subindustries.first().map(String::as_str)),
            hq: w.optional("hq", record.hq.as_deref()),
            size: w.optional("size", record.size.as_deref()),
            linkedin_url: w.optional("linkedin_url", record.linkedin_url.as_deref()),
            confidence: Confidence::High,
            match_type: MatchType::Ai,
            notes: None,
            sources: w.sources,
        };
    }

    // Unresolved: low confidence, no provenance, fields echo the input.
    EnrichedResult {
        id,
        company_name: identity.raw_name.clone(),
        original_data: row.clone(),
        domain: identity.domain.clone(),
        country: identity.country.clone().unwrap_or_default(),
        industry: identity.industry.clone().unwrap_or_default(),
        subindustry: identity.subindustry.clone(),
        hq: None,
        size: identity.size.bucket.clone(),
        linkedin_url: identity.linkedin_url.clone(),
        confidence: Confidence::Low,
        match_type: MatchType::None,
        notes: outcome.note.clone(),
        sources: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DirectoryRecord;

    fn row(pairs: &[(&str, &str)]) -> InputRow {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Some((*v).to_string())))
            .collect()
    }

    fn outcome_hit(record: DirectoryRecord, match_type: MatchType) -> MatchOutcome {
        MatchOutcome {
            record: Some(record),
            match_type,
            note: None,
        }
    }

    fn outcome_miss(note: &str) -> MatchOutcome {
        MatchOutcome {
            record: None,
            match_type: MatchType::None,
            note: Some(note.to_string()),
        }
    }

    #[test]
    fn test_internal_hit_tags_every_populated_field_internal() {
        let r = row(&[("Domain", "google.com")]);
        let identity = NormalizedIdentity::from_row(&r);
        let record = DirectoryRecord {
            name: Some("Google".to_string()),
            countries: vec!["US".to_string()],
            size: Some("10001+".to_string()),
            ..DirectoryRecord::new("google.com")
        };
        let result = resolve_fields(1, &r, &identity, &outcome_hit(record, MatchType::Exact), None);

        assert_eq!(result.company_name, "Google");
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.country, "US");
        assert!(result.notes.is_none());
        assert!(!result.sources.is_empty());
        assert!(result.sources.values().all(|p| *p == Provenance::Internal));
        assert_eq!(result.sources.get("size"), Some(&Provenance::Internal));
        // Industry was absent on the record: no value, no provenance.
        assert!(result.industry.is_empty());
        assert!(!result.sources.contains_key("industry"));
    }

    #[test]
    fn test_ai_hit_tags_every_populated_field_ai() {
        let r = row(&[("Company Name", "Acme Inc.")]);
        let identity = NormalizedIdentity::from_row(&r);
        let ai = AiCompanyRecord {
            name: Some("Acme Corp".to_string()),
            domain: Some("acme.com".to_string()),
            countries: vec!["US".to_string()],
            hq: Some("HQ".to_string()),
            linkedin_url: Some("https://linkedin.com/company/acme".to_string()),
            ..AiCompanyRecord::default()
        };
        let result = resolve_fields(
            2,
            &r,
            &identity,
            &outcome_miss("Company not found"),
            Some(&ai),
        );

        assert_eq!(result.match_type, MatchType::Ai);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.company_name, "Acme Corp");
        assert_eq!(result.domain, "acme.com");
        assert!(result.notes.is_none());
        assert!(result.sources.values().all(|p| *p == Provenance::Ai));
        assert_eq!(result.sources.get("companyName"), Some(&Provenance::Ai));
        assert_eq!(result.sources.get("hq"), Some(&Provenance::Ai));
    }

    #[test]
    fn test_unresolved_row_is_low_confidence_with_note() {
        let r = row(&[("Domain", "nowhere.com"), ("Company Name", "Nowhere")]);
        let identity = NormalizedIdentity::from_row(&r);
        let result = resolve_fields(3, &r, &identity, &outcome_miss("Domain not found"), None);

        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.match_type, MatchType::None);
        assert_eq!(result.notes.as_deref(), Some("Domain not found"));
        assert!(result.sources.is_empty());
        assert_eq!(result.domain, "nowhere.com");
        assert_eq!(result.company_name, "Nowhere");
    }

    #[test]
    fn test_original_data_round_trips_verbatim() {
        let mut r = row(&[("Domain", "acme.com"), ("Custom Column", "kept")]);
        r.insert("Empty".to_string(), None);
        let identity = NormalizedIdentity::from_row(&r);
        let result = resolve_fields(1, &r, &identity, &outcome_miss("Domain not found"), None);
        assert_eq!(result.original_data, r);
    }
}
