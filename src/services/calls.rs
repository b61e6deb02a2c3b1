use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::config::OutboundCallConfig;
use crate::errors::ServiceError;

/// Handle returned by the telephony provider for an initiated call.
#[derive(Clone, Debug, Deserialize)]
pub struct CallHandle {
    pub call_id: String,
}

/// Best-effort outbound calling. Callers on the fire-and-forget path log
/// failures and move on; nothing downstream waits on the result.
#[async_trait]
pub trait OutboundDialer: Send + Sync {
    async fn initiate_call(
        &self,
        phone: &str,
        script_prompt: &str,
        opening_line: &str,
    ) -> Result<CallHandle, ServiceError>;
}

#[cfg(test)]
mockall::mock! {
    pub Dialer {}

    #[async_trait]
    impl OutboundDialer for Dialer {
        async fn initiate_call(
            &self,
            phone: &str,
            script_prompt: &str,
            opening_line: &str,
        ) -> Result<CallHandle, ServiceError>;
    }
}

/// Dialer over a telephony HTTP API. With no endpoint configured every
/// call is a logged no-op that still returns a handle.
pub struct HttpOutboundDialer {
    client: Client,
    config: OutboundCallConfig,
}

impl HttpOutboundDialer {
    pub fn new(config: OutboundCallConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl OutboundDialer for HttpOutboundDialer {
    #[instrument(skip(self, script_prompt, opening_line))]
    async fn initiate_call(
        &self,
        phone: &str,
        script_prompt: &str,
        opening_line: &str,
    ) -> Result<CallHandle, ServiceError> {
        let Some(endpoint) = &self.config.endpoint else {
            info!(phone, "outbound calling not configured, skipping");
            return Ok(CallHandle {
                call_id: "not-configured".to_string(),
            });
        };

        let mut req = self.client.post(endpoint).json(&serde_json::json!({
            "to": phone,
            "from": self.config.from_number,
            "script_prompt": script_prompt,
            "opening_line": opening_line,
        }));
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ServiceError::CallInitiationFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ServiceError::CallInitiationFailed(format!(
                "telephony endpoint returned {}",
                resp.status()
            )));
        }

        resp.json::<CallHandle>()
            .await
            .map_err(|e| ServiceError::CallInitiationFailed(e.to_string()))
    }
}

/// Builds a `tel:` URL for direct device dial-out. Formatting characters
/// are stripped; a leading `+` is kept.
pub fn dial_link(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .enumerate()
        .filter(|(i, c)| c.is_ascii_digit() || (*i == 0 && *c == '+'))
        .map(|(_, c)| c)
        .collect();
    format!("tel:{}", cleaned)
}
