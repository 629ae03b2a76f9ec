//! Job domain types for planning requests moving through the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::CoreError;
use crate::schedule::{JobRequest, JobResult};

/// Unique identifier for a job, using ULID for chronological sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Create a new unique job ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a job ID from a string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| CoreError::InvalidId(format!("{s}: {e}")))
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Current status of a job in its lifecycle.
///
/// Transitions only ever follow `Queued -> Processing -> {Done, Failed}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting in the dispatch queue.
    #[default]
    Queued,
    /// Handed to the worker; a reply is pending.
    Processing,
    /// The worker produced a schedule.
    Done,
    /// The worker could not produce a schedule.
    Failed,
}

impl JobStatus {
    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    /// Whether moving from `self` to `next` respects the lifecycle.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Done)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }

    /// Status name as it appears on the wire and in event streams.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::Processing => "Processing",
            JobStatus::Done => "Done",
            JobStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consistent point-in-time copy of a job.
///
/// `status` and `result` are always read together, so a snapshot never
/// shows `Done` without its result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub id: JobId,
    pub status: JobStatus,
    pub request: JobRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobSnapshot {
    /// Whether a result can be handed out for this job.
    pub fn is_ready(&self) -> bool {
        self.status == JobStatus::Done && self.result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_only_moves_forward() {
        use JobStatus::*;

        assert!(Queued.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Done));
        assert!(Processing.can_transition_to(Failed));

        assert!(!Queued.can_transition_to(Done));
        assert!(!Queued.can_transition_to(Failed));
        assert!(!Queued.can_transition_to(Queued));
        assert!(!Processing.can_transition_to(Queued));
        assert!(!Processing.can_transition_to(Processing));
        for terminal in [Done, Failed] {
            for next in [Queued, Processing, Done, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn status_serializes_as_its_name() {
        assert_eq!(serde_json::to_string(&JobStatus::Processing).unwrap(), "\"Processing\"");
        assert_eq!(JobStatus::Failed.to_string(), "Failed");
        assert!(JobStatus::Done.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
    }

    #[test]
    fn job_id_parses_its_own_display() {
        let id = JobId::new();
        let parsed: JobId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!(matches!(JobId::parse("not-a-ulid"), Err(CoreError::InvalidId(_))));
    }
}
