//! Tiered resolution of a normalized identity against the directory.
//!
//! Tiers run in order and short-circuit on the first hit:
//! 1. exact domain equality,
//! 2. LinkedIn slug equality over records carrying a LinkedIn URL,
//! 3. case-insensitive normalized-name equality narrowed by optional
//!    attribute filters.
//!
//! Store read failures are not surfaced: a failed read degrades to a
//! no-match for that tier and is logged.

use tracing::{debug, warn};

use crate::directory::{DirectoryStore, MatchFilters};
use crate::identity::NormalizedIdentity;
use crate::normalize::extract_linkedin_slug;
use crate::record::{DirectoryRecord, MatchType};

/// Miss notes, most specific applicable reason first.
const NOTE_DOMAIN: &str = "Domain not found";
const NOTE_LINKEDIN: &str = "LinkedIn URL not found";
const NOTE_COMPANY: &str = "Company not found";

/// The outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// The matched record, when any tier hit.
    pub record: Option<DirectoryRecord>,
    /// Which signals resolved the row, or `None`.
    pub match_type: MatchType,
    /// Failure reason on a miss.
    pub note: Option<String>,
}

impl MatchOutcome {
    /// True when a directory record was found.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.record.is_some()
    }

    fn hit(record: DirectoryRecord, match_type: MatchType) -> Self {
        Self {
            record: Some(record),
            match_type,
            note: None,
        }
    }

    fn miss(note: &str) -> Self {
        Self {
            record: None,
            match_type: MatchType::None,
            note: Some(note.to_string()),
        }
    }
}

/// Builds tier-3 attribute filters from an identity. Only resolved
/// attributes become filters; raw unmapped values never constrain the
/// match.
fn filters_for(identity: &NormalizedIdentity) -> MatchFilters {
    MatchFilters {
        country: identity.country.clone(),
        industry: identity.industry.clone(),
        subindustry: identity.subindustry.clone(),
        size: if identity.size.is_empty() {
            None
        } else {
            Some(identity.size.clone())
        },
        keywords: identity.keywords.clone(),
    }
}

fn name_match_type(identity: &NormalizedIdentity) -> MatchType {
    if !identity.domain.is_empty() {
        MatchType::DomainCompanyName
    } else if !identity.linkedin_slug.is_empty() {
        MatchType::LinkedInUrlCompanyName
    } else {
        MatchType::CompanyName
    }
}

/// Resolves `identity` against the directory, trying each tier only when
/// the prior tier produced nothing.
#[must_use]
pub fn match_identity(store: &dyn DirectoryStore, identity: &NormalizedIdentity) -> MatchOutcome {
    // Tier 1: exact domain.
    if !identity.domain.is_empty() {
        match store.find_by_domain(&identity.domain) {
            Ok(Some(record)) => {
                debug!(domain = %identity.domain, "resolved by exact domain");
                return MatchOutcome::hit(record, MatchType::Exact);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(domain = %identity.domain, error = %err, "domain lookup failed, treating as no match");
            }
        }
    }

    // Tier 2: LinkedIn slug, compared via the same extraction rule used
    // on input URLs.
    if !identity.linkedin_slug.is_empty() {
        match store.list_with_linkedin() {
            Ok(records) => {
                for record in records {
                    let Some(url) = record.linkedin_url.as_deref() else {
                        continue;
                    };
                    let slug = extract_linkedin_slug(url);
                    if !slug.is_empty() && slug.eq_ignore_ascii_case(&identity.linkedin_slug) {
                        let match_type = if identity.domain.is_empty() {
                            MatchType::LinkedInUrl
                        } else {
                            MatchType::DomainLinkedInUrl
                        };
                        debug!(slug = %identity.linkedin_slug, "resolved by LinkedIn slug");
                        return MatchOutcome::hit(record, match_type);
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "LinkedIn listing failed, treating as no match");
            }
        }
    }

    // Tier 3: normalized name narrowed by attribute filters.
    if !identity.name.is_empty() {
        let filters = filters_for(identity);
        match store.find_by_name_with_filters(&identity.name, &filters) {
            Ok(Some(record)) => {
                debug!(name = %identity.name, "resolved by name and attributes");
                return MatchOutcome::hit(record, name_match_type(identity));
            }
            Ok(None) => {}
            Err(err) => {
                warn!(name = %identity.name, error = %err, "name lookup failed, treating as no match");
            }
        }
    }

    if !identity.domain.is_empty() {
        MatchOutcome::miss(NOTE_DOMAIN)
    } else if !identity.linkedin_slug.is_empty() {
        MatchOutcome::miss(NOTE_LINKEDIN)
    } else {
        MatchOutcome::miss(NOTE_COMPANY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{InMemoryDirectoryStore, StoreError};
    use crate::record::InputRow;

    fn identity(pairs: &[(&str, &str)]) -> NormalizedIdentity {
        let row: InputRow = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Some((*v).to_string())))
            .collect();
        NormalizedIdentity::from_row(&row)
    }

    fn record(name: &str, domain: &str) -> DirectoryRecord {
        DirectoryRecord {
            name: Some(name.to_string()),
            ..DirectoryRecord::new(domain)
        }
    }

    #[test]
    fn test_tier1_domain_hit() {
        let store = InMemoryDirectoryStore::with_records(vec![record("Google", "google.com")]);
        let outcome = match_identity(&store, &identity(&[("Domain", "google.com")]));
        assert!(outcome.is_hit());
        assert_eq!(outcome.match_type, MatchType::Exact);
        assert_eq!(outcome.record.unwrap().name.as_deref(), Some("Google"));
    }

    #[test]
    fn test_tier_ordering_domain_wins_over_name() {
        // The record matches both by domain and by name; the matcher must
        // report Exact, never fall through to name matching.
        let store = InMemoryDirectoryStore::with_records(vec![record("Acme", "acme.com")]);
        let outcome = match_identity(
            &store,
            &identity(&[("Domain", "https://www.acme.com"), ("Company Name", "Acme Inc.")]),
        );
        assert_eq!(outcome.match_type, MatchType::Exact);
    }

    #[test]
    fn test_tier2_slug_hit_without_domain() {
        let mut rec = record("Acme", "acme.com");
        rec.linkedin_url = Some("https://www.linkedin.com/company/Acme-Co/".to_string());
        let store = InMemoryDirectoryStore::with_records(vec![rec]);

        let outcome = match_identity(
            &store,
            &identity(&[("LinkedIn URL", "linkedin.com/company/acme-co")]),
        );
        assert_eq!(outcome.match_type, MatchType::LinkedInUrl);
        assert!(outcome.is_hit());
    }

    #[test]
    fn test_tier2_slug_hit_after_domain_miss() {
        let mut rec = record("Acme", "acme.com");
        rec.linkedin_url = Some("https://linkedin.com/company/acme-co".to_string());
        let store = InMemoryDirectoryStore::with_records(vec![rec]);

        let outcome = match_identity(
            &store,
            &identity(&[
                ("Domain", "other-domain.com"),
                ("LinkedIn URL", "https://linkedin.com/company/acme-co"),
            ]),
        );
        assert_eq!(outcome.match_type, MatchType::DomainLinkedInUrl);
    }

    #[test]
    fn test_tier3_name_with_attribute_filters() {
        let mut us = record("Acme", "acme-us.com");
        us.countries = vec!["US".to_string()];
        let mut de = record("Acme", "acme-de.com");
        de.countries = vec!["DE".to_string()];
        let store = InMemoryDirectoryStore::with_records(vec![us, de]);

        let outcome = match_identity(
            &store,
            &identity(&[("Company Name", "Acme Inc."), ("Country", "Germany")]),
        );
        assert_eq!(outcome.match_type, MatchType::CompanyName);
        assert_eq!(outcome.record.unwrap().domain, "acme-de.com");
    }

    #[test]
    fn test_tier3_match_type_reflects_present_signals() {
        let store = InMemoryDirectoryStore::with_records(vec![record("Acme", "acme.com")]);

        let outcome = match_identity(
            &store,
            &identity(&[("Company Name", "Acme"), ("Domain", "unknown.com")]),
        );
        assert_eq!(outcome.match_type, MatchType::DomainCompanyName);

        let outcome = match_identity(
            &store,
            &identity(&[
                ("Company Name", "Acme"),
                ("LinkedIn URL", "linkedin.com/company/nope"),
            ]),
        );
        assert_eq!(outcome.match_type, MatchType::LinkedInUrlCompanyName);
    }

    #[test]
    fn test_miss_notes_prefer_most_specific_signal() {
        let store = InMemoryDirectoryStore::new();

        let outcome = match_identity(
            &store,
            &identity(&[("Domain", "x.com"), ("Company Name", "X")]),
        );
        assert_eq!(outcome.note.as_deref(), Some("Domain not found"));
        assert_eq!(outcome.match_type, MatchType::None);

        let outcome = match_identity(
            &store,
            &identity(&[("LinkedIn URL", "linkedin.com/company/x"), ("Company Name", "X")]),
        );
        assert_eq!(outcome.note.as_deref(), Some("LinkedIn URL not found"));

        let outcome = match_identity(&store, &identity(&[("Company Name", "X")]));
        assert_eq!(outcome.note.as_deref(), Some("Company not found"));
    }

    struct FailingStore;

    impl DirectoryStore for FailingStore {
        fn find_by_domain(&self, _: &str) -> Result<Option<DirectoryRecord>, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        fn find_by_name_with_filters(
            &self,
            _: &str,
            _: &MatchFilters,
        ) -> Result<Option<DirectoryRecord>, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        fn list_with_linkedin(&self) -> Result<Vec<DirectoryRecord>, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        fn upsert(&self, _: DirectoryRecord) -> Result<(), StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        fn record_provenance(
            &self,
            _: &str,
            _: &crate::directory::ProvenanceNote,
        ) -> Result<(), StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
    }

    #[test]
    fn test_read_failures_degrade_to_no_match() {
        let outcome = match_identity(
            &FailingStore,
            &identity(&[("Domain", "x.com"), ("Company Name", "X")]),
        );
        assert!(!outcome.is_hit());
        assert_eq!(outcome.note.as_deref(), Some("Domain not found"));
    }
}
