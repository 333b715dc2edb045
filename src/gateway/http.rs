use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::RemoteAnalyzer;
use crate::error::GatewayError;
use crate::parse::types::AnalysisResult;

/// Remote analyzer reached over HTTP: `POST <endpoint>` with the raw payload,
/// expecting `{ num_nodes, num_edges, is_dag }` back.
#[derive(Debug, Clone)]
pub struct HttpAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpAnalyzer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("pipeline-analyzer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::from(e)
        }
    }
}

#[async_trait]
impl RemoteAnalyzer for HttpAnalyzer {
    async fn analyze(&self, payload: &Value) -> Result<AnalysisResult, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice::<AnalysisResult>(&bytes)
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
