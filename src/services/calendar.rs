use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::CalendarConfig;
use crate::errors::ServiceError;

/// One-way export of restock events to an external calendar. No read-back;
/// with no endpoint configured exports are logged and dropped.
pub struct CalendarExportService {
    client: Client,
    config: CalendarConfig,
}

impl CalendarExportService {
    pub fn new(config: CalendarConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[instrument(skip(self, description))]
    pub async fn export_event(
        &self,
        title: &str,
        description: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let Some(endpoint) = &self.config.endpoint else {
            debug!(title, "calendar export not configured, dropping event");
            return Ok(());
        };

        let resp = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({
                "title": title,
                "description": description,
                "start": start.to_rfc3339(),
                "end": end.to_rfc3339(),
            }))
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "calendar endpoint returned {}",
                resp.status()
            )));
        }
        Ok(())
    }
}
