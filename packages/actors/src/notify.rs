//! Per-job state and status notification.
//!
//! Every [`JobEntry`] guards its status, result and subscribers with its own
//! lock, so publishing for one job never contends with another. Subscribers
//! are unbounded channels: publishing only enqueues, it never waits on an
//! observer.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use planner_core::{CoreError, JobId, JobRequest, JobResult, JobSnapshot, JobStatus, StatusEvent};
use tokio::sync::mpsc;

/// Identifies one subscriber of a job.
pub type SubscriberId = u64;

struct Subscriber {
    id: SubscriberId,
    tx: mpsc::UnboundedSender<StatusEvent>,
}

struct JobState {
    status: JobStatus,
    result: Option<JobResult>,
    updated_at: DateTime<Utc>,
    subscribers: Vec<Subscriber>,
    next_subscriber: SubscriberId,
    /// Deleted while still queued; it must never start.
    abandoned: bool,
}

/// A registered subscription to one job's status.
#[derive(Debug)]
pub struct Subscription {
    /// Status at the moment of subscribing; always delivered first.
    pub current: StatusEvent,
    /// Later transitions; `None` when the job was already terminal.
    pub updates: Option<mpsc::UnboundedReceiver<StatusEvent>>,
    /// Handle for [`JobEntry::unsubscribe`]; `None` when nothing was attached.
    pub id: Option<SubscriberId>,
}

impl Subscription {
    /// Whether further transitions can still arrive.
    pub fn is_live(&self) -> bool {
        self.updates.is_some()
    }
}

/// A job and its live bookkeeping.
pub struct JobEntry {
    id: JobId,
    request: JobRequest,
    created_at: DateTime<Utc>,
    state: Mutex<JobState>,
}

impl JobEntry {
    /// Create a new queued job.
    pub fn new(id: JobId, request: JobRequest) -> Self {
        let now = Utc::now();
        Self {
            id,
            request,
            created_at: now,
            state: Mutex::new(JobState {
                status: JobStatus::Queued,
                result: None,
                updated_at: now,
                subscribers: Vec::new(),
                next_subscriber: 0,
                abandoned: false,
            }),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    /// The request captured at submission.
    pub fn request(&self) -> &JobRequest {
        &self.request
    }

    pub fn status(&self) -> JobStatus {
        self.lock().status
    }

    /// Result of the job, present only once it is `Done`.
    pub fn result(&self) -> Option<JobResult> {
        self.lock().result.clone()
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Consistent copy of the job.
    pub fn snapshot(&self) -> JobSnapshot {
        let state = self.lock();
        JobSnapshot {
            id: self.id,
            status: state.status,
            request: self.request.clone(),
            result: state.result.clone(),
            created_at: self.created_at,
            updated_at: state.updated_at,
        }
    }

    /// Attach a subscriber.
    ///
    /// The current status is captured under the same lock that publishing
    /// takes, so the subscriber sees it followed by every later transition,
    /// with nothing missed or repeated. A terminal or abandoned job attaches
    /// nothing and only replays its last status.
    pub fn subscribe(&self) -> Subscription {
        let mut state = self.lock();
        let current = StatusEvent {
            job_id: self.id,
            status: state.status,
            timestamp: state.updated_at,
        };

        if state.status.is_terminal() || state.abandoned {
            return Subscription {
                current,
                updates: None,
                id: None,
            };
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let id = state.next_subscriber;
        state.next_subscriber += 1;
        state.subscribers.push(Subscriber { id, tx });

        Subscription {
            current,
            updates: Some(rx),
            id: Some(id),
        }
    }

    /// Detach a subscriber. Returns whether it was still attached.
    pub fn unsubscribe(&self, subscriber: SubscriberId) -> bool {
        let mut state = self.lock();
        let before = state.subscribers.len();
        state.subscribers.retain(|s| s.id != subscriber);
        state.subscribers.len() != before
    }

    /// Give up on a job that never started.
    ///
    /// A queued job is marked so that [`mark_processing`](Self::mark_processing)
    /// refuses it, and its subscribers are detached, which ends their
    /// streams. A job that already started is left alone. Returns the number
    /// of subscribers released.
    pub fn abandon(&self) -> usize {
        let mut state = self.lock();
        if state.status != JobStatus::Queued {
            return 0;
        }
        state.abandoned = true;
        std::mem::take(&mut state.subscribers).len()
    }

    /// Move the job to `Processing` and notify subscribers.
    pub fn mark_processing(&self) -> Result<usize, CoreError> {
        self.publish(JobStatus::Processing, None)
    }

    /// Store the result, move the job to `Done` and notify subscribers.
    pub fn complete(&self, result: JobResult) -> Result<usize, CoreError> {
        self.publish(JobStatus::Done, Some(result))
    }

    /// Move the job to `Failed` and notify subscribers.
    pub fn fail(&self) -> Result<usize, CoreError> {
        self.publish(JobStatus::Failed, None)
    }

    /// Apply a transition and deliver it to every attached subscriber in
    /// attachment order. Subscribers whose receiver is gone are dropped.
    /// Returns the number of subscribers that received the event.
    fn publish(&self, status: JobStatus, result: Option<JobResult>) -> Result<usize, CoreError> {
        let mut state = self.lock();
        if state.abandoned {
            return Err(CoreError::Abandoned(self.id));
        }
        if !state.status.can_transition_to(status) {
            return Err(CoreError::InvalidTransition {
                from: state.status,
                to: status,
            });
        }

        let event = StatusEvent::new(self.id, status);
        state.status = status;
        state.updated_at = event.timestamp;
        if status == JobStatus::Done {
            state.result = result;
        }

        let attached = state.subscribers.len();
        state.subscribers.retain(|s| s.tx.send(event).is_ok());
        let delivered = state.subscribers.len();
        if delivered < attached {
            tracing::debug!(
                "Job {}: dropped {} disconnected subscribers",
                self.id,
                attached - delivered
            );
        }

        if status.is_terminal() {
            // Closing the senders ends every subscriber's stream.
            state.subscribers.clear();
        }

        Ok(delivered)
    }

    fn lock(&self) -> MutexGuard<'_, JobState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for JobEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobEntry")
            .field("id", &self.id)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
