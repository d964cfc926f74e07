//! reqwest client for the playground server (http://127.0.0.1:6767 by default).

use std::time::Duration;

use async_trait::async_trait;

use super::protocol::{InferenceRequest, LogListing, StatusResponse, SubmissionResult};
use super::PlaygroundApi;
use crate::error::ClientError;
use crate::form::FunctionInput;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:6767";

/// Client for the playground HTTP API.
#[derive(Clone)]
pub struct PlaygroundClient {
    base_url: String,
    client: reqwest::Client,
}

impl PlaygroundClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Client with a per-request timeout.
    pub fn with_timeout(base_url: Option<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    fn with_client(base_url: Option<String>, client: reqwest::Client) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check(res: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ClientError::Api(format!("{} {}", status, body)));
        }
        Ok(res)
    }
}

#[async_trait]
impl PlaygroundApi for PlaygroundClient {
    /// GET /api/status: key presence and function definitions.
    async fn status(&self) -> Result<StatusResponse, ClientError> {
        let url = format!("{}/api/status", self.base_url);
        log::debug!("GET {}", url);
        let res = Self::check(self.client.get(&url).send().await?).await?;
        Ok(res.json().await?)
    }

    /// POST /api/inference: run one function.
    async fn inference(
        &self,
        name: &str,
        input: Option<FunctionInput>,
    ) -> Result<SubmissionResult, ClientError> {
        let url = format!("{}/api/inference", self.base_url);
        let body = InferenceRequest {
            name: name.to_string(),
            input,
        };
        log::debug!("POST {} ({})", url, name);
        let res = Self::check(self.client.post(&url).json(&body).send().await?).await?;
        Ok(res.json().await?)
    }

    /// GET /api/inference-log?page=N: pages start at 1.
    async fn list_logs(&self, page: u32) -> Result<LogListing, ClientError> {
        let url = format!("{}/api/inference-log", self.base_url);
        let page = page.max(1);
        log::debug!("GET {}?page={}", url, page);
        let res = Self::check(
            self.client
                .get(&url)
                .query(&[("page", page)])
                .send()
                .await?,
        )
        .await?;
        Ok(res.json().await?)
    }

    /// DELETE /api/log/{id}.
    async fn delete_log(&self, entry_id: &str) -> Result<(), ClientError> {
        let url = format!("{}/api/log/{}", self.base_url, entry_id);
        log::debug!("DELETE {}", url);
        Self::check(self.client.delete(&url).send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let c = PlaygroundClient::new(Some("http://localhost:8080/".to_string()));
        assert_eq!(c.base_url(), "http://localhost:8080");
        let c = PlaygroundClient::new(Some(String::new()));
        assert_eq!(c.base_url(), DEFAULT_BASE_URL);
        let c = PlaygroundClient::new(None);
        assert_eq!(c.base_url(), DEFAULT_BASE_URL);
    }
}
