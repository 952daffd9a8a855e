use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::BackendError;
use crate::model::{ChatReply, ChatRequest, SyncReport, SyncRequest};

/// HTTP client for the Shop Agent backend (`/sync` and `/chat`).
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build from config. `override_url` comes from `--backend-url` / env.
    pub fn from_config(config: &Config, override_url: Option<&str>) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.resolve_backend_url(override_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Trigger a catalog sync. Any non-2xx status is an error.
    pub async fn sync(&self, request: &SyncRequest) -> Result<SyncReport, BackendError> {
        let url = format!("{}/sync", self.base_url);
        info!(shop_url = %request.shop_url, "starting catalog sync");

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "sync rejected by backend");
            return Err(BackendError::Status(status));
        }

        // The body is informational only; an empty or non-JSON 2xx still counts.
        let body = response.text().await?;
        let report = serde_json::from_str::<SyncReport>(&body).unwrap_or_default();
        info!(products_indexed = ?report.products_indexed, "sync finished");
        Ok(report)
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let url = format!("{}/chat", self.base_url);
        debug!(chars = request.message.chars().count(), "sending chat message");

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "chat request failed");
            return Err(BackendError::Status(status));
        }

        let body = response.bytes().await?;
        let reply: ChatReply = serde_json::from_slice(&body)?;
        debug!(products = reply.products.len(), "chat reply received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let client = BackendClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn from_config_uses_override() {
        let config = Config {
            backend_url: Some("http://from-file".into()),
            request_timeout_secs: Some(5),
            ..Config::default()
        };
        let client = BackendClient::from_config(&config, Some("http://from-flag/")).unwrap();
        assert_eq!(client.base_url(), "http://from-flag");
    }
}
