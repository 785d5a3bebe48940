use anyhow::{anyhow, bail};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    column::Column,
    config::HttpServiceConfig,
    default::{BUCKETS_PATH, COUNTS_PATH, METRICS_PATH},
    histogram::HistogramEntry,
    request::HistogramRequest,
};

use super::ComputationService;

/// JSON-over-HTTP client for the computation service.
#[derive(Debug, Clone)]
pub struct HttpComputationService {
    client: Client,
    base_url: String,
}
impl HttpComputationService {
    pub fn new(config: &HttpServiceConfig) -> anyhow::Result<Self> {
        config.check_http_config()?;
        let client = Client::builder()
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| anyhow!("Error building http client: {}", e))?;
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    pub(crate) fn endpoint(&self, path: &str, project: &str) -> String {
        format!("{}/{}/{}", self.base_url, path, project)
    }

    async fn post<B, T>(&self, path: &str, project: &str, body: &B) -> anyhow::Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path, project);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("POST {} failed: {}", url, e))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("POST {} returned {}: {}", url, status, text);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| anyhow!("Cannot decode response of {}: {}", url, e))
    }
}
#[async_trait]
impl ComputationService for HttpComputationService {
    async fn resolve_buckets(
        &self,
        project: &str,
        columns: &[Column],
    ) -> anyhow::Result<Vec<Vec<HistogramEntry>>> {
        self.post(BUCKETS_PATH, project, columns).await
    }

    async fn compute_counts(
        &self,
        project: &str,
        request: &HistogramRequest,
    ) -> anyhow::Result<Vec<Vec<u64>>> {
        self.post(COUNTS_PATH, project, request).await
    }

    async fn compute_metric(
        &self,
        project: &str,
        request: &HistogramRequest,
    ) -> anyhow::Result<Vec<Vec<Option<f64>>>> {
        self.post(METRICS_PATH, project, request).await
    }
}
