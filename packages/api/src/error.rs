use actors::ActorError;
use planner_core::{JobId, JobStatus};
use serde::Serialize;
use thiserror::Error;
use worker_bridge::BridgeError;

/// Errors reported to callers of [`PlannerService`](crate::PlannerService).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Job {id} is not done yet (status: {status})")]
    NotReady { id: JobId, status: JobStatus },

    #[error("Invalid job ID: {0}")]
    InvalidId(String),

    #[error("Dispatcher unavailable: {0}")]
    Dispatch(#[from] ActorError),

    #[error("Worker bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Error payload for an HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

impl ApiError {
    /// HTTP status an adapter should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::NotReady { .. } | ApiError::InvalidId(_) => 400,
            ApiError::Dispatch(_) | ApiError::Bridge(_) => 503,
            ApiError::Config(_) => 500,
        }
    }

    /// Response body; a not-ready job carries its current status.
    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::NotReady { status, .. } => ErrorBody {
                error: "Job is not done yet".to_string(),
                status: Some(*status),
            },
            other => ErrorBody {
                error: other.to_string(),
                status: None,
            },
        }
    }
}
