use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::VendorSearchConfig;
use crate::errors::ServiceError;
use crate::models::VendorCandidate;

/// External vendor discovery: free-text query in, candidate list out.
#[async_trait]
pub trait VendorDirectory: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<VendorCandidate>, ServiceError>;
}

#[cfg(test)]
mockall::mock! {
    pub Directory {}

    #[async_trait]
    impl VendorDirectory for Directory {
        async fn search(&self, query: &str) -> Result<Vec<VendorCandidate>, ServiceError>;
    }
}

/// Discovery client over an HTTP text-to-structured-data lookup. The
/// response body is semi-structured; candidate extraction is delegated to
/// [`extract_candidates`].
pub struct HttpVendorDirectory {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpVendorDirectory {
    pub fn new(config: &VendorSearchConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl VendorDirectory for HttpVendorDirectory {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<VendorCandidate>, ServiceError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "query": query }));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ServiceError::VendorSearchFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ServiceError::VendorSearchFailed(format!(
                "discovery endpoint returned {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ServiceError::VendorSearchFailed(e.to_string()))?;

        let candidates = extract_candidates(&body)?;
        debug!(count = candidates.len(), "vendor discovery returned candidates");
        Ok(candidates)
    }
}

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid regex"));

/// Pulls a vendor-candidate array out of a semi-structured discovery
/// response. Accepted shapes, tried in order: the whole body as JSON, a
/// fenced code block, the outermost bracketed block inside prose. Anything
/// else is a `ParseFailure`; malformed input never escapes as a panic.
pub fn extract_candidates(raw: &str) -> Result<Vec<VendorCandidate>, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::ParseFailure(
            "empty discovery response".to_string(),
        ));
    }

    if let Some(found) = parse_fragment(trimmed) {
        return Ok(found);
    }

    if let Some(caps) = FENCED_JSON.captures(trimmed) {
        if let Some(found) = parse_fragment(caps[1].trim()) {
            return Ok(found);
        }
    }

    if let (Some(open), Some(close)) = (trimmed.find('['), trimmed.rfind(']')) {
        if open < close {
            if let Some(found) = parse_fragment(&trimmed[open..=close]) {
                return Ok(found);
            }
        }
    }

    Err(ServiceError::ParseFailure(
        "no vendor list found in discovery response".to_string(),
    ))
}

fn parse_fragment(fragment: &str) -> Option<Vec<VendorCandidate>> {
    let value: Value = serde_json::from_str(fragment).ok()?;
    let list = match value {
        Value::Array(_) => value,
        Value::Object(ref map) => map.get("vendors").cloned()?,
        _ => return None,
    };
    serde_json::from_value(list).ok()
}
