use thiserror::Error;

use crate::{JobId, JobStatus};

/// Errors raised by the domain types themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid job ID: {0}")]
    InvalidId(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Job {0} was abandoned before it started")]
    Abandoned(JobId),
}
