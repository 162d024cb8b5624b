//! Job orchestration: drives a batch of rows through normalization,
//! deduplication, matching, the AI fallback, and field resolution.
//!
//! A job is an atomic unit of work: `Created -> Processing -> Completed`,
//! no failed state. Partial failures are absorbed per-row (single mode)
//! or per-chunk (batch mode); a job always completes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ai::{AiCompanyRecord, CompanyQuery, EnrichmentProvider};
use crate::dedupe::{dedupe_by_domain, dedupe_rows};
use crate::directory::{DirectoryStore, ProvenanceNote, StoreError};
use crate::error::{EnrichError, EnrichResult};
use crate::identity::NormalizedIdentity;
use crate::matcher::{match_identity, MatchOutcome};
use crate::record::{DirectoryRecord, EnrichedResult, FieldStats, InputRow};
use crate::resolver::resolve_fields;

/// Unresolved-row count above which the engine switches from per-row
/// calls to batched provider calls.
const DEFAULT_BATCH_THRESHOLD: usize = 10;

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, not yet running.
    Created,
    /// Rows are being driven through the pipeline.
    Processing,
    /// All rows processed. Terminal.
    Completed,
}

/// Job-level aggregate, mutated while rows are processed and immutable
/// once the job completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMeta {
    /// Job identifier.
    pub job_id: Uuid,
    /// Caller-supplied job name.
    pub job_name: String,
    /// Name of the file the rows came from.
    pub source_file: String,
    /// Lifecycle state.
    pub status: JobStatus,
    /// Rows entering the pipeline after validation and dedup.
    pub total_records: u64,
    /// Rows fully processed so far.
    pub processed_records: u64,
    /// Total internally sourced field values.
    pub internal_fields: u64,
    /// Total AI-sourced field values.
    pub ai_fields: u64,
    /// Per-field counters.
    pub field_stats: FieldStats,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobMeta {
    fn new(job_name: &str, source_file: &str) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            job_name: job_name.to_string(),
            source_file: source_file.to_string(),
            status: JobStatus::Created,
            total_records: 0,
            processed_records: 0,
            internal_fields: 0,
            ai_fields: 0,
            field_stats: FieldStats::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Percentage view over a job's meta, as reported by job listings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    /// Processed rows as a percentage of total rows.
    pub progress: u8,
    /// Share of enriched field values sourced internally.
    pub internal_pct: f64,
    /// Share of enriched field values sourced from the AI fallback.
    pub ai_pct: f64,
}

/// A stored job: its aggregate meta plus the per-row results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Aggregate metrics and lifecycle state.
    pub meta: JobMeta,
    /// Per-row results in input order.
    pub results: Vec<EnrichedResult>,
}

/// Store abstraction for jobs. Lifetime and backing are a configuration
/// choice injected into the engine, not ambient global state.
pub trait JobStore: Send + Sync {
    /// Insert or replace a job keyed by its id.
    fn put(&self, record: JobRecord) -> Result<(), StoreError>;

    /// Fetch a job by id.
    fn get(&self, job_id: &Uuid) -> Result<Option<JobRecord>, StoreError>;

    /// All stored job metas, insertion-ordered.
    fn list(&self) -> Result<Vec<JobMeta>, StoreError>;
}

fn lock_err(context: &'static str) -> StoreError {
    StoreError::Backend(format!("poisoned lock: {context}"))
}

#[derive(Debug, Default)]
struct JobState {
    by_id: HashMap<Uuid, JobRecord>,
    order: Vec<Uuid>,
}

/// Thread-safe in-memory job store.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    state: RwLock<JobState>,
}

impl InMemoryJobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn put(&self, record: JobRecord) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| lock_err("put"))?;
        let id = record.meta.job_id;
        if state.by_id.insert(id, record).is_none() {
            state.order.push(id);
        }
        Ok(())
    }

    fn get(&self, job_id: &Uuid) -> Result<Option<JobRecord>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("get"))?;
        Ok(state.by_id.get(job_id).cloned())
    }

    fn list(&self) -> Result<Vec<JobMeta>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("list"))?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.by_id.get(id))
            .map(|r| r.meta.clone())
            .collect())
    }
}

/// The enrichment engine: ties the directory, the AI provider, and the
/// job store together and drives jobs through the pipeline.
pub struct EnrichmentEngine {
    directory: Arc<dyn DirectoryStore>,
    provider: Arc<dyn EnrichmentProvider>,
    jobs: Arc<dyn JobStore>,
    batch_threshold: usize,
}

impl EnrichmentEngine {
    /// Creates an engine over the given collaborators.
    #[must_use]
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        provider: Arc<dyn EnrichmentProvider>,
        jobs: Arc<dyn JobStore>,
    ) -> Self {
        Self {
            directory,
            provider,
            jobs,
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
        }
    }

    /// Overrides the unresolved-row count above which batched provider
    /// calls are used.
    #[must_use]
    pub fn with_batch_threshold(mut self, threshold: usize) -> Self {
        self.batch_threshold = threshold;
        self
    }

    /// The job store, for callers serving job listings.
    #[must_use]
    pub fn jobs(&self) -> &Arc<dyn JobStore> {
        &self.jobs
    }

    /// Fetches a stored job.
    pub fn get_job(&self, job_id: &Uuid) -> EnrichResult<Option<JobRecord>> {
        Ok(self.jobs.get(job_id)?)
    }

    /// Percentage view of a job's meta.
    #[must_use]
    pub fn job_progress(meta: &JobMeta) -> JobProgress {
        let progress = if meta.total_records == 0 {
            match meta.status {
                JobStatus::Completed => 100,
                _ => 0,
            }
        } else {
            ((meta.processed_records * 100) / meta.total_records).min(100) as u8
        };
        let enriched = meta.internal_fields + meta.ai_fields;
        let (internal_pct, ai_pct) = if enriched == 0 {
            (0.0, 0.0)
        } else {
            (
                meta.internal_fields as f64 * 100.0 / enriched as f64,
                meta.ai_fields as f64 * 100.0 / enriched as f64,
            )
        };
        JobProgress {
            progress,
            internal_pct,
            ai_pct,
        }
    }

    /// Identity-tuple dedup for the preprocessing path (directory
    /// uploads). Duplicate rows are dropped silently.
    #[must_use]
    pub fn preprocess_rows(&self, rows: Vec<InputRow>) -> Vec<InputRow> {
        dedupe_rows(rows)
    }

    /// Looks up a single company: directory first, then the provider.
    ///
    /// This is the one path where an AI hard failure propagates to the
    /// caller. A provider success is cache-filled into the directory so
    /// the next lookup resolves internally.
    pub fn lookup_company(&self, query: &CompanyQuery) -> EnrichResult<DirectoryRecord> {
        if let Some(domain) = query.domain.as_deref() {
            if let Some(record) = self.directory.find_by_domain(domain)? {
                return Ok(record);
            }
        }

        let ai = self.provider.fetch_company(query).map_err(EnrichError::Ai)?;
        let Some(record) = ai.to_directory_record() else {
            return Err(EnrichError::internal(
                "provider response carried no domain to key the record by",
            ));
        };
        self.cache_fill(&ai);
        Ok(record)
    }

    /// Runs a full enrichment job. Always completes; per-row and
    /// per-chunk failures degrade to unresolved rows.
    pub fn run_job(
        &self,
        job_name: &str,
        source_file: &str,
        rows: Vec<InputRow>,
    ) -> EnrichResult<JobRecord> {
        let mut meta = JobMeta::new(job_name, source_file);

        // Rows without any usable identifier are dropped before
        // counting; the primary path dedupes on normalized domain.
        let pairs: Vec<(InputRow, NormalizedIdentity)> = rows
            .into_iter()
            .map(|row| {
                let identity = NormalizedIdentity::from_row(&row);
                (row, identity)
            })
            .filter(|(_, identity)| identity.has_identifier())
            .collect();
        let pairs = dedupe_by_domain(pairs);

        meta.total_records = pairs.len() as u64;
        meta.status = JobStatus::Created;
        self.jobs.put(JobRecord {
            meta: meta.clone(),
            results: Vec::new(),
        })?;

        meta.status = JobStatus::Processing;
        info!(job_id = %meta.job_id, rows = pairs.len(), "job started");

        let outcomes: Vec<MatchOutcome> = pairs
            .iter()
            .map(|(_, identity)| {
                let outcome = match_identity(self.directory.as_ref(), identity);
                if let Some(record) = outcome.record.as_ref() {
                    self.touch_provenance(&record.domain, source_file);
                }
                outcome
            })
            .collect();

        let unresolved: Vec<usize> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.is_hit())
            .map(|(i, _)| i)
            .collect();

        let ai_results = self.resolve_unresolved(&pairs, &unresolved);
        for record in ai_results.iter().flatten() {
            self.cache_fill(record);
        }

        let mut ai_by_row: HashMap<usize, AiCompanyRecord> = HashMap::new();
        for (idx, record) in unresolved.iter().zip(ai_results) {
            if let Some(record) = record {
                ai_by_row.insert(*idx, record);
            }
        }

        let mut results = Vec::with_capacity(pairs.len());
        for (i, (row, identity)) in pairs.iter().enumerate() {
            let result = resolve_fields(i + 1, row, identity, &outcomes[i], ai_by_row.get(&i));
            meta.field_stats.record(&result);
            meta.processed_records += 1;
            results.push(result);
        }

        meta.internal_fields = meta.field_stats.internal_total();
        meta.ai_fields = meta.field_stats.ai_total();
        meta.status = JobStatus::Completed;
        meta.completed_at = Some(Utc::now());
        info!(
            job_id = %meta.job_id,
            processed = meta.processed_records,
            internal_fields = meta.internal_fields,
            ai_fields = meta.ai_fields,
            "job completed"
        );

        let record = JobRecord { meta, results };
        self.jobs.put(record.clone())?;
        Ok(record)
    }

    /// Invokes the provider for every unresolved row, choosing the call
    /// shape by volume. Returns one optional record per unresolved
    /// index, in order.
    fn resolve_unresolved(
        &self,
        pairs: &[(InputRow, NormalizedIdentity)],
        unresolved: &[usize],
    ) -> Vec<Option<AiCompanyRecord>> {
        if unresolved.is_empty() {
            return Vec::new();
        }
        let queries: Vec<CompanyQuery> = unresolved
            .iter()
            .map(|i| CompanyQuery::from_identity(&pairs[*i].1))
            .collect();

        if queries.len() > self.batch_threshold {
            debug!(count = queries.len(), "using batched AI fallback");
            match self.provider.fetch_batch(&queries) {
                Ok(records) => records.into_iter().map(Some).collect(),
                Err(err) => {
                    warn!(error = %err, "batched AI fallback failed, rows stay unresolved");
                    vec![None; queries.len()]
                }
            }
        } else {
            queries
                .iter()
                .map(|query| match self.provider.fetch_company(query) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        warn!(error = %err, "AI fallback failed, row stays unresolved");
                        None
                    }
                })
                .collect()
        }
    }

    /// Persists an AI result into the directory unless a record for that
    /// domain already exists. Best-effort: failures are logged and
    /// swallowed.
    fn cache_fill(&self, ai: &AiCompanyRecord) {
        let Some(record) = ai.to_directory_record() else {
            return;
        };
        match self.directory.find_by_domain(&record.domain) {
            Ok(Some(_)) => {}
            Ok(None) => {
                if let Err(err) = self.directory.upsert(record) {
                    warn!(error = %err, "cache-fill upsert failed");
                }
            }
            Err(err) => {
                warn!(error = %err, "cache-fill existence check failed");
            }
        }
    }

    /// Best-effort provenance write against a matched record; an `Err`
    /// is logged and discarded, never surfaced to the row.
    fn touch_provenance(&self, domain: &str, source_file: &str) {
        let note = ProvenanceNote {
            uploaded_by: None,
            source_file: Some(source_file.to_string()),
        };
        if let Err(err) = self.directory.record_provenance(domain, &note) {
            warn!(domain, error = %err, "provenance write failed");
        }
    }
}
