//! Unified diagnostic type used across all phases, plus the error enums of the
//! I/O-facing components (gateway, store, server).

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Parse,
    Schema,
    Structure,
    Analyze,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Schema => write!(f, "Schema"),
            Phase::Structure => write!(f, "Structure"),
            Phase::Analyze => write!(f, "Analyze"),
        }
    }
}

/// A single diagnostic. `path` is a JSON pointer into the submitted payload
/// (e.g. `/nodes/0/id`) when the problem can be located.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) if !path.is_empty() => write!(
                f,
                "[{}:{}] {} (at '{}')",
                self.phase, self.code, self.message, path
            ),
            _ => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for PipelineError {}

impl PipelineError {
    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        PipelineError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            path: None,
        }
    }

    pub fn schema(code: &str, message: impl Into<String>, path: impl Into<String>) -> Self {
        PipelineError {
            code: code.into(),
            phase: Phase::Schema,
            message: message.into(),
            path: Some(path.into()),
        }
    }

    pub fn structure(code: &str, message: impl Into<String>, path: Option<String>) -> Self {
        PipelineError {
            code: code.into(),
            phase: Phase::Structure,
            message: message.into(),
            path,
        }
    }

    pub fn analyze(code: &str, message: impl Into<String>) -> Self {
        PipelineError {
            code: code.into(),
            phase: Phase::Analyze,
            message: message.into(),
            path: None,
        }
    }
}

/// Why a delegated analysis did not produce a result.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("remote analyzer did not answer within {0:?}")]
    Timeout(Duration),

    #[error("remote analyzer returned HTTP {0}")]
    Status(u16),

    #[error("remote analyzer unreachable: {0}")]
    Transport(String),

    #[error("remote analyzer sent an unreadable body: {0}")]
    Decode(String),
}

#[cfg(feature = "server")]
impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            GatewayError::Status(status.as_u16())
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pipeline store backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed HTTP request: {0}")]
    BadRequest(String),

    #[error("request body of {size} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { size: usize, limit: usize },

    #[error("request not received within {0:?}")]
    Timeout(Duration),
}
