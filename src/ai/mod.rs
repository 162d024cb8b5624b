//! AI fallback adapter.
//!
//! Invoked only when the matcher produces no internal record. The
//! provider is a black-box lookup capability behind the
//! [`EnrichmentProvider`] trait; the bundled [`HttpEnrichmentProvider`]
//! speaks a chat-completion style JSON protocol.

pub mod http;
pub mod response;

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::NormalizedIdentity;
use crate::record::DirectoryRecord;

pub use http::HttpEnrichmentProvider;

/// Errors raised by the AI enrichment adapter.
#[derive(Debug, Error)]
pub enum AiError {
    /// No API credential is configured.
    #[error("AI provider API key is not set")]
    MissingApiKey,

    /// The provider answered with a non-2xx status. Raised immediately,
    /// never retried.
    #[error("AI provider returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The response could not be shaped into the expected record schema.
    #[error("Failed to parse AI response: {0}")]
    ParseFailed(String),

    /// Network-level failure reaching the provider.
    #[error("AI request transport error: {0}")]
    Transport(String),

    /// All retry attempts were exhausted. Callers treat this as "no
    /// data", not a fatal job error.
    #[error("AI enrichment unavailable after retries: {0}")]
    Unavailable(String),
}

impl AiError {
    /// True for hard failures that must surface to the adapter's caller
    /// without retrying.
    #[must_use]
    pub const fn is_hard(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// True for transient failures covered by the backoff schedule.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::ParseFailed(_))
    }
}

/// The identifying signals sent to the provider. Unknown fields are kept
/// as `None`/empty and serialized as explicit nulls so the provider can
/// distinguish "not asked" from "not found".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyQuery {
    /// Company name, when known.
    pub name: Option<String>,
    /// Domain, when known.
    pub domain: Option<String>,
    /// LinkedIn URL, when known.
    pub linkedin_url: Option<String>,
    /// ISO alpha-2 country code, when known.
    pub country: Option<String>,
    /// Industry label, when known.
    pub industry: Option<String>,
    /// Subindustry label, when known.
    pub subindustry: Option<String>,
    /// Raw size value, when known.
    pub size: Option<String>,
    /// Known keywords.
    pub keywords: Vec<String>,
}

impl CompanyQuery {
    /// Builds a query from a normalized identity, carrying every known
    /// signal.
    #[must_use]
    pub fn from_identity(identity: &NormalizedIdentity) -> Self {
        let some_nonempty = |s: &str| {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        };
        Self {
            name: some_nonempty(&identity.raw_name).or_else(|| some_nonempty(&identity.name)),
            domain: some_nonempty(&identity.domain),
            linkedin_url: identity.linkedin_url.clone(),
            country: identity.country.clone(),
            industry: identity.industry.clone(),
            subindustry: identity.subindustry.clone(),
            size: identity.size.bucket.clone(),
            keywords: identity.keywords.clone(),
        }
    }
}

/// The fixed schema every provider response is coerced into. Missing or
/// wrong-typed fields become `None`/empty rather than errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiCompanyRecord {
    /// Company name.
    pub name: Option<String>,
    /// Primary domain.
    pub domain: Option<String>,
    /// Countries of operation.
    pub countries: Vec<String>,
    /// Headquarters.
    pub hq: Option<String>,
    /// Industry.
    pub industry: Option<String>,
    /// Subindustries.
    pub subindustries: Vec<String>,
    /// Contextual keywords.
    pub keywords: Vec<String>,
    /// Employee size.
    pub size: Option<String>,
    /// LinkedIn URL.
    pub linkedin_url: Option<String>,
    /// LinkedIn slug.
    pub slug: Option<String>,
    /// Name as originally known.
    pub original_name: Option<String>,
    /// Registered legal name.
    pub legal_name: Option<String>,
}

impl AiCompanyRecord {
    /// Converts to a directory record for cache-fill. Returns `None`
    /// when the response carries no domain to key the record by.
    #[must_use]
    pub fn to_directory_record(&self) -> Option<DirectoryRecord> {
        let domain = self.domain.as_deref()?.trim();
        if domain.is_empty() {
            return None;
        }
        Some(DirectoryRecord {
            name: self.name.clone(),
            countries: self.countries.clone(),
            hq: self.hq.clone(),
            industry: self.industry.clone(),
            subindustry: self.subindustries.first().cloned(),
            keywords: self.keywords.clone(),
            size: self.size.clone(),
            linkedin_url: self.linkedin_url.clone(),
            slug: self.slug.clone(),
            original_name: self.original_name.clone(),
            legal_name: self.legal_name.clone(),
            ..DirectoryRecord::new(domain)
        })
    }
}

/// The external enrichment capability: `lookup(query) -> record | error`.
pub trait EnrichmentProvider: Send + Sync {
    /// Resolves a single company, with the transient-failure retry
    /// schedule applied.
    fn fetch_company(&self, query: &CompanyQuery) -> Result<AiCompanyRecord, AiError>;

    /// Resolves several companies in chunked batch requests. Failures
    /// are not retried per-item; any failure fails the whole batch.
    fn fetch_batch(&self, queries: &[CompanyQuery]) -> Result<Vec<AiCompanyRecord>, AiError>;
}

/// Provider configuration. Base URL, path, model, credential, timeout,
/// and batch size are deployment choices.
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    /// Provider base URL.
    pub base_url: String,
    /// Request path appended to the base URL.
    pub path: String,
    /// Model identifier.
    pub model: String,
    /// API credential. Requests fail with [`AiError::MissingApiKey`]
    /// when unset.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Companies per batched request.
    pub batch_size: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            path: "/chat/completions".to_string(),
            model: "deepseek-chat".to_string(),
            api_key: None,
            timeout_secs: 30,
            batch_size: 20,
        }
    }
}

impl AiConfig {
    /// Reads configuration from the environment, falling back to
    /// defaults field by field.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("DEEPSEEK_BASE_URL").unwrap_or(defaults.base_url),
            path: env::var("DEEPSEEK_PATH").unwrap_or(defaults.path),
            model: env::var("DEEPSEEK_MODEL").unwrap_or(defaults.model),
            api_key: env::var("DEEPSEEK_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout_secs: env::var("DEEPSEEK_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            batch_size: defaults.batch_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::InputRow;

    #[test]
    fn test_error_classification() {
        assert!(AiError::Http {
            status: 500,
            body: String::new()
        }
        .is_hard());
        assert!(!AiError::Transport("refused".to_string()).is_hard());
        assert!(AiError::Transport("refused".to_string()).is_transient());
        assert!(AiError::ParseFailed("bad".to_string()).is_transient());
        assert!(!AiError::Unavailable("gave up".to_string()).is_transient());
    }

    #[test]
    fn test_query_from_identity_prefers_raw_name() {
        let row: InputRow = [
            ("Company Name".to_string(), Some("Acme Inc.".to_string())),
            ("Domain".to_string(), Some("https://acme.com".to_string())),
        ]
        .into_iter()
        .collect();
        let identity = NormalizedIdentity::from_row(&row);
        let query = CompanyQuery::from_identity(&identity);
        assert_eq!(query.name.as_deref(), Some("Acme Inc."));
        assert_eq!(query.domain.as_deref(), Some("acme.com"));
        assert_eq!(query.linkedin_url, None);
    }

    #[test]
    fn test_to_directory_record_requires_domain() {
        let record = AiCompanyRecord {
            name: Some("Acme Corp".to_string()),
            domain: Some("Acme.com".to_string()),
            countries: vec!["US".to_string()],
            subindustries: vec!["SaaS".to_string(), "Fintech".to_string()],
            ..AiCompanyRecord::default()
        };
        let dir = record.to_directory_record().unwrap();
        assert_eq!(dir.domain, "acme.com");
        assert_eq!(dir.subindustry.as_deref(), Some("SaaS"));

        let no_domain = AiCompanyRecord::default();
        assert!(no_domain.to_directory_record().is_none());
    }

    #[test]
    fn test_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.base_url, "https://api.deepseek.com");
        assert_eq!(config.path, "/chat/completions");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.batch_size, 20);
        assert!(config.api_key.is_none());
    }
}
