//! Event types for real-time status updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{JobId, JobStatus};

/// A single status transition of a job, as delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub job_id: JobId,
    pub status: JobStatus,
    pub timestamp: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new(job_id: JobId, status: JobStatus) -> Self {
        Self {
            job_id,
            status,
            timestamp: Utc::now(),
        }
    }

    /// Whether no further events will follow this one.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
