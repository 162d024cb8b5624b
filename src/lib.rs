//! # bizmatch - Company Record Matching & Enrichment
//!
//! bizmatch resolves raw company rows against an internal company
//! directory and, when the directory cannot resolve a row, against an
//! external AI enrichment provider. Every resolved field carries its
//! provenance so downstream consumers can tell internal data from
//! AI-sourced data.
//!
//! ## Pipeline
//!
//! - **Normalization**: legal-suffix stripping, domain extraction,
//!   LinkedIn slug extraction, country/industry mapping, size parsing
//! - **Deduplication**: identity-tuple dedup for uploads, domain dedup
//!   for enrichment jobs
//! - **Matching**: tiered resolution (domain, LinkedIn slug, name plus
//!   attribute filters), first hit wins
//! - **AI fallback**: unresolved rows go to an [`ai::EnrichmentProvider`],
//!   singly or batched by volume
//! - **Resolution**: field merging with per-field provenance and
//!   per-field statistics
//! - **Jobs**: [`job::EnrichmentEngine`] drives whole files through the
//!   pipeline as `Created -> Processing -> Completed` jobs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bizmatch::ai::{AiConfig, HttpEnrichmentProvider};
//! use bizmatch::directory::InMemoryDirectoryStore;
//! use bizmatch::job::{EnrichmentEngine, InMemoryJobStore};
//!
//! let directory = Arc::new(InMemoryDirectoryStore::new());
//! let provider = Arc::new(HttpEnrichmentProvider::new(AiConfig::from_env())?);
//! let jobs = Arc::new(InMemoryJobStore::new());
//! let engine = EnrichmentEngine::new(directory, provider, jobs);
//!
//! let job = engine.run_job("q3-accounts", "accounts.csv", rows)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ai;
pub mod dedupe;
pub mod directory;
pub mod error;
pub mod identity;
pub mod job;
pub mod matcher;
pub mod normalize;
pub mod record;
pub mod reference;
pub mod resolver;

pub use ai::{AiCompanyRecord, AiConfig, AiError, CompanyQuery, EnrichmentProvider};
pub use dedupe::{dedupe_by_domain, dedupe_rows};
pub use directory::{DirectoryStore, InMemoryDirectoryStore, MatchFilters, StoreError};
pub use error::{EnrichError, EnrichResult};
pub use identity::NormalizedIdentity;
pub use job::{EnrichmentEngine, InMemoryJobStore, JobMeta, JobRecord, JobStatus, JobStore};
pub use matcher::{match_identity, MatchOutcome};
pub use record::{
    Confidence, DirectoryRecord, EnrichedResult, FieldStat, FieldStats, InputRow, MatchType,
    Provenance,
};
pub use resolver::resolve_fields;
