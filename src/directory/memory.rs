//! In-memory directory backend.
//!
//! Thread-safe reference implementation of [`DirectoryStore`], intended
//! for embedded usage and tests. Records keep insertion order, which is
//! the backend's natural ordering for tier-3 first-match-wins scans.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::directory::store::{DirectoryStore, MatchFilters, ProvenanceNote, StoreError};
use crate::normalize::{normalize_company_name, parse_employee_size, EmployeeSize};
use crate::record::DirectoryRecord;

fn lock_err(context: &'static str) -> StoreError {
    StoreError::Backend(format!("poisoned lock: {context}"))
}

fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase()
}

/// True when the record's size matches the wanted size by exact count,
/// bucket label, or raw string.
fn size_matches(record_size: Option<&str>, wanted: &EmployeeSize) -> bool {
    let Some(raw) = record_size else {
        return false;
    };
    let parsed = parse_employee_size(raw);
    if let (Some(a), Some(b)) = (parsed.count, wanted.count) {
        if a == b {
            return true;
        }
    }
    if let (Some(a), Some(b)) = (parsed.bucket.as_deref(), wanted.bucket.as_deref()) {
        if a.eq_ignore_ascii_case(b) {
            return true;
        }
    }
    wanted
        .bucket
        .as_deref()
        .is_some_and(|b| raw.trim().eq_ignore_ascii_case(b))
}

fn record_passes_filters(record: &DirectoryRecord, filters: &MatchFilters) -> bool {
    if let Some(country) = filters.country.as_deref() {
        let wanted = country.to_lowercase();
        let hit = record.countries.iter().any(|c| {
            let have = c.to_lowercase();
            have == wanted || have.contains(&wanted)
        });
        if !hit {
            return false;
        }
    }

    if let Some(industry) = filters.industry.as_deref() {
        let hit = record
            .industry
            .as_deref()
            .is_some_and(|i| i.trim().eq_ignore_ascii_case(industry.trim()));
        if !hit {
            return false;
        }
    }

    if let Some(subindustry) = filters.subindustry.as_deref() {
        let hit = record
            .subindustry
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(subindustry.trim()));
        if !hit {
            return false;
        }
    }

    if let Some(size) = filters.size.as_ref() {
        if !size.is_empty() && !size_matches(record.size.as_deref(), size) {
            return false;
        }
    }

    // AND across keywords: every wanted keyword must be contained in at
    // least one record keyword.
    for wanted in &filters.keywords {
        let wanted = wanted.to_lowercase();
        let hit = record
            .keywords
            .iter()
            .any(|k| k.to_lowercase().contains(&wanted));
        if !hit {
            return false;
        }
    }

    true
}

#[derive(Debug, Default)]
struct DirectoryState {
    records: Vec<DirectoryRecord>,
    by_domain: HashMap<String, usize>,
    provenance: HashMap<String, ProvenanceNote>,
}

/// Thread-safe in-memory directory store.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryStore {
    state: RwLock<DirectoryState>,
}

impl InMemoryDirectoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `records`.
    #[must_use]
    pub fn with_records(records: Vec<DirectoryRecord>) -> Self {
        let store = Self::new();
        for record in records {
            // Infallible for the in-memory backend.
            let _ = store.upsert(record);
        }
        store
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.state.read().map_err(|_| lock_err("len"))?.records.len())
    }

    /// True when the store holds no records.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// The provenance note recorded for `domain`, if any.
    pub fn provenance_for(&self, domain: &str) -> Result<Option<ProvenanceNote>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("provenance_for"))?;
        Ok(state.provenance.get(&normalize_key(domain)).cloned())
    }
}

impl DirectoryStore for InMemoryDirectoryStore {
    fn find_by_domain(&self, domain: &str) -> Result<Option<DirectoryRecord>, StoreError> {
        let key = normalize_key(domain);
        if key.is_empty() {
            return Ok(None);
        }
        let state = self.state.read().map_err(|_| lock_err("find_by_domain"))?;
        Ok(state
            .by_domain
            .get(&key)
            .and_then(|idx| state.records.get(*idx))
            .cloned())
    }

    fn find_by_name_with_filters(
        &self,
        name: &str,
        filters: &MatchFilters,
    ) -> Result<Option<DirectoryRecord>, StoreError> {
        let wanted = normalize_key(name);
        if wanted.is_empty() {
            return Ok(None);
        }
        let state = self
            .state
            .read()
            .map_err(|_| lock_err("find_by_name_with_filters"))?;
        Ok(state
            .records
            .iter()
            .find(|record| {
                let record_name = record
                    .name
                    .as_deref()
                    .map(normalize_company_name)
                    .unwrap_or_default();
                normalize_key(&record_name) == wanted && record_passes_filters(record, filters)
            })
            .cloned())
    }

    fn list_with_linkedin(&self) -> Result<Vec<DirectoryRecord>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("list_with_linkedin"))?;
        Ok(state
            .records
            .iter()
            .filter(|r| r.linkedin_url.as_deref().is_some_and(|u| !u.trim().is_empty()))
            .cloned()
            .collect())
    }

    fn upsert(&self, mut record: DirectoryRecord) -> Result<(), StoreError> {
        record.domain = normalize_key(&record.domain);
        if record.domain.is_empty() {
            return Err(StoreError::Backend(
                "cannot upsert a record without a domain".to_string(),
            ));
        }
        let mut state = self.state.write().map_err(|_| lock_err("upsert"))?;
        if let Some(idx) = state.by_domain.get(&record.domain).copied() {
            state.records[idx] = record;
        } else {
            let key = record.domain.clone();
            state.records.push(record);
            let idx = state.records.len() - 1;
            state.by_domain.insert(key, idx);
        }
        Ok(())
    }

    fn record_provenance(&self, domain: &str, note: &ProvenanceNote) -> Result<(), StoreError> {
        let key = normalize_key(domain);
        let mut state = self.state.write().map_err(|_| lock_err("record_provenance"))?;
        if !state.by_domain.contains_key(&key) {
            return Err(StoreError::NotFound(key));
        }
        state.provenance.insert(key, note.clone());
        Ok(())
    }
}
