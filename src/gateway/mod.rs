//! Delegating analysis front door.
//!
//! Tries a remote analyzer once, bounded by a timeout, and falls back to the
//! local `validate::analyze_value` on any failure. Callers that only want the
//! answer use `Resolution::into_outcome`, which has the same shape on every
//! path.

mod http;

pub use http::HttpAnalyzer;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{GatewayError, PipelineError};
use crate::parse::types::AnalysisResult;
use crate::validate;

/// Matches the bounded wait of the editor backend.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

pub type Outcome = Result<AnalysisResult, Vec<PipelineError>>;

/// A service able to analyze a raw `{ nodes, edges }` payload.
#[async_trait]
pub trait RemoteAnalyzer: Send + Sync {
    async fn analyze(&self, payload: &Value) -> Result<AnalysisResult, GatewayError>;
}

/// Which path served a request.
#[derive(Debug)]
pub enum Resolution {
    /// The remote analyzer answered in time.
    Delegated(AnalysisResult),
    /// The remote analyzer failed; the local analysis answered instead.
    FellBack { reason: GatewayError, outcome: Outcome },
    /// No remote analyzer is configured.
    Local(Outcome),
}

impl Resolution {
    pub fn into_outcome(self) -> Outcome {
        match self {
            Resolution::Delegated(result) => Ok(result),
            Resolution::FellBack { outcome, .. } => outcome,
            Resolution::Local(outcome) => outcome,
        }
    }

    pub fn is_delegated(&self) -> bool {
        matches!(self, Resolution::Delegated(_))
    }
}

#[derive(Clone)]
pub struct AnalysisGateway {
    remote: Option<Arc<dyn RemoteAnalyzer>>,
    timeout: Duration,
}

impl AnalysisGateway {
    /// Gateway that always analyzes in-process.
    pub fn local() -> Self {
        Self {
            remote: None,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_remote(remote: Arc<dyn RemoteAnalyzer>, timeout: Duration) -> Self {
        Self {
            remote: Some(remote),
            timeout,
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Resolve one payload. The payload is forwarded to the remote untouched;
    /// a remote answer is returned as-is.
    pub async fn resolve(&self, payload: &Value) -> Resolution {
        let Some(remote) = &self.remote else {
            return Resolution::Local(validate::analyze_value(payload));
        };

        let reason = match tokio::time::timeout(self.timeout, remote.analyze(payload)).await {
            Ok(Ok(result)) => {
                info!(
                    num_nodes = result.num_nodes,
                    num_edges = result.num_edges,
                    is_dag = result.is_dag,
                    "remote analyzer served request"
                );
                return Resolution::Delegated(result);
            }
            Ok(Err(e)) => e,
            Err(_) => GatewayError::Timeout(self.timeout),
        };

        warn!(%reason, "falling back to local analysis");
        Resolution::FellBack {
            reason,
            outcome: validate::analyze_value(payload),
        }
    }
}

impl Default for AnalysisGateway {
    fn default() -> Self {
        Self::local()
    }
}
