//! Blocking HTTP provider.
//!
//! Single-record requests are retried on transient failures with a
//! 0.5s/1s/2s backoff schedule (four attempts total). HTTP error
//! statuses are raised immediately without retry. Batched requests are
//! single-attempt: any failure fails the whole chunk.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::ai::response::{parse_batch_response, parse_company_response};
use crate::ai::{AiCompanyRecord, AiConfig, AiError, CompanyQuery, EnrichmentProvider};

/// Backoff delays between transient-failure retries.
const BACKOFF: &[Duration] = &[
    Duration::from_millis(500),
    Duration::from_millis(1000),
    Duration::from_millis(2000),
];

/// System prompt instructing the model to answer with strictly the
/// expected JSON object.
const SYSTEM_PROMPT: &str = "You are an information-retrieval and data-enrichment engine. \
Given optional company name, domain, and LinkedIn URL, return a SINGLE JSON object \
with these keys only and nothing else (no prose):\n\n\
{\n\
  \"name\": null,\n\
  \"domain\": null,\n\
  \"countries\": [],\n\
  \"hq\": null,\n\
  \"industry\": null,\n\
  \"subindustries\": [],\n\
  \"keywords_cntxt\": [],\n\
  \"size\": null,\n\
  \"linkedin_url\": null,\n\
  \"slug\": null,\n\
  \"original_name\": null,\n\
  \"legal_name\": null\n\
}\n\n\
Rules: If unknown, use null or []. Do not include any text outside JSON. \
Prefer official LinkedIn and company site. Ensure linkedin_url and slug are correct.";

fn marker(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("null")
}

/// Renders the user message. Unknowns are written as explicit `null`
/// (`[]` for keywords) so the provider cannot conflate "not asked" with
/// "not found".
fn user_content(query: &CompanyQuery) -> String {
    let keywords = if query.keywords.is_empty() {
        "[]".to_string()
    } else {
        query.keywords.join(", ")
    };
    format!(
        "Input:\n\
         name: {}\n\
         domain: {}\n\
         linkedin_url: {}\n\
         country: {}\n\
         industry: {}\n\
         subindustry: {}\n\
         size: {}\n\
         keywords: {keywords}\n",
        marker(query.name.as_deref()),
        marker(query.domain.as_deref()),
        marker(query.linkedin_url.as_deref()),
        marker(query.country.as_deref()),
        marker(query.industry.as_deref()),
        marker(query.subindustry.as_deref()),
        marker(query.size.as_deref()),
    )
}

/// Blocking provider speaking the chat-completion protocol.
pub struct HttpEnrichmentProvider {
    config: AiConfig,
    client: Client,
}

impl HttpEnrichmentProvider {
    /// Builds a provider from configuration.
    ///
    /// # Errors
    /// Returns [`AiError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: AiConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AiError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn api_key(&self) -> Result<&str, AiError> {
        self.config.api_key.as_deref().ok_or(AiError::MissingApiKey)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.path
        )
    }

    fn single_payload(&self, query: &CompanyQuery) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_content(query)},
            ],
            "response_format": {"type": "json_object"},
            "temperature": 0.0,
        })
    }

    fn batch_payload(&self, chunk: &[CompanyQuery]) -> Value {
        json!({
            "model": self.config.model,
            "input": chunk,
        })
    }

    /// One request attempt. Non-2xx statuses become [`AiError::Http`];
    /// network and body-decoding failures become transient errors.
    fn post(&self, payload: &Value) -> Result<Value, AiError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AiError::Http {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<Value>()
            .map_err(|e| AiError::ParseFailed(e.to_string()))
    }
}

impl EnrichmentProvider for HttpEnrichmentProvider {
    fn fetch_company(&self, query: &CompanyQuery) -> Result<AiCompanyRecord, AiError> {
        let payload = self.single_payload(query);
        let mut last_err: Option<AiError> = None;

        for (attempt, backoff) in BACKOFF
            .iter()
            .map(Some)
            .chain(std::iter::once(None))
            .enumerate()
        {
            match self.post(&payload).and_then(|v| parse_company_response(&v)) {
                Ok(record) => return Ok(record),
                Err(err) if err.is_hard() || matches!(err, AiError::MissingApiKey) => {
                    return Err(err);
                }
                Err(err) => {
                    debug!(attempt, error = %err, "transient AI failure");
                    last_err = Some(err);
                    match backoff {
                        Some(delay) => thread::sleep(*delay),
                        None => break,
                    }
                }
            }
        }

        let reason = last_err.map_or_else(|| "unknown".to_string(), |e| e.to_string());
        Err(AiError::Unavailable(reason))
    }

    fn fetch_batch(&self, queries: &[CompanyQuery]) -> Result<Vec<AiCompanyRecord>, AiError> {
        let chunk_size = self.config.batch_size.max(1);
        let mut results = Vec::with_capacity(queries.len());
        for chunk in queries.chunks(chunk_size) {
            let payload = self.batch_payload(chunk);
            let body = self.post(&payload).inspect_err(
                |err| warn!(chunk_len = chunk.len(), error = %err, "batch request failed"),
            )?;
            results.extend(parse_batch_response(&body, chunk.len())?);
        }
        Ok(results)
    }
}
