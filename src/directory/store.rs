//! Abstract directory store contract.
//!
//! The persistence collaborator owns transaction discipline; this crate
//! treats each call as an atomic external operation that may fail
//! independently. Domain and name comparisons are case-insensitive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::EmployeeSize;
use crate::record::DirectoryRecord;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Optional equality filters that progressively narrow tier-3 name
/// matching. Empty filters match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchFilters {
    /// ISO alpha-2 country code; matches by array membership or substring.
    pub country: Option<String>,
    /// Industry label, compared case-insensitively.
    pub industry: Option<String>,
    /// Subindustry label, compared case-insensitively.
    pub subindustry: Option<String>,
    /// Employee size; matches exact count, bucket label, or raw string.
    pub size: Option<EmployeeSize>,
    /// Keywords that must all be contained in the record's keyword set.
    pub keywords: Vec<String>,
}

impl MatchFilters {
    /// True when no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.country.is_none()
            && self.industry.is_none()
            && self.subindustry.is_none()
            && self.size.as_ref().map_or(true, EmployeeSize::is_empty)
            && self.keywords.is_empty()
    }
}

/// Provenance metadata recorded against a matched record, best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceNote {
    /// Who triggered the enrichment.
    pub uploaded_by: Option<String>,
    /// The source file the row came from.
    pub source_file: Option<String>,
}

/// Read/write contract for the internal company directory.
pub trait DirectoryStore: Send + Sync {
    /// Find a record by domain, case-insensitively. `Ok(None)` on miss.
    fn find_by_domain(&self, domain: &str) -> Result<Option<DirectoryRecord>, StoreError>;

    /// Find the first record (in the directory's natural ordering) whose
    /// normalized name equals `name` case-insensitively and which passes
    /// every set filter.
    fn find_by_name_with_filters(
        &self,
        name: &str,
        filters: &MatchFilters,
    ) -> Result<Option<DirectoryRecord>, StoreError>;

    /// All records carrying a LinkedIn URL, in natural ordering.
    fn list_with_linkedin(&self) -> Result<Vec<DirectoryRecord>, StoreError>;

    /// Insert or update a record keyed by its domain.
    fn upsert(&self, record: DirectoryRecord) -> Result<(), StoreError>;

    /// Record provenance metadata against the record for `domain`.
    ///
    /// Callers treat this as best-effort: an `Err` is logged and
    /// discarded, never surfaced to the row being enriched.
    fn record_provenance(&self, domain: &str, note: &ProvenanceNote) -> Result<(), StoreError>;
}
