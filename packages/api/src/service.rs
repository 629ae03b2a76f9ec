//! Inbound operations of the planner.
//!
//! [`PlannerService`] is what an HTTP adapter calls into: submit a request,
//! follow its status, fetch its schedule, delete it.

use std::sync::Arc;
use std::time::Duration;

use actors::{DispatchStats, DispatcherHandle, JobEntry, JobRegistry, start_dispatcher};
use planner_core::{JobId, JobRequest, JobResult, JobSnapshot, JobStatus};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use worker_bridge::ComputeBackend;

use crate::error::ApiError;
use crate::realtime::StatusStream;

/// How long [`PlannerService::stats`] waits for the dispatcher to be free.
pub const STATS_TIMEOUT: Duration = Duration::from_secs(2);

/// Handle to a running planner: registry, dispatch queue and notification.
///
/// Cheap to clone; all clones share the same jobs.
#[derive(Clone)]
pub struct PlannerService {
    registry: Arc<JobRegistry>,
    dispatcher: DispatcherHandle,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PlannerService {
    /// Start a planner that computes with `backend`.
    pub async fn start(backend: Arc<dyn ComputeBackend>) -> Result<Self, ApiError> {
        let registry = Arc::new(JobRegistry::new());
        let (dispatcher, task) = start_dispatcher(registry.clone(), backend).await?;

        Ok(Self {
            registry,
            dispatcher,
            task: Arc::new(Mutex::new(Some(task))),
        })
    }

    /// Parse a job ID received from a client.
    pub fn parse_id(id: &str) -> Result<JobId, ApiError> {
        JobId::parse(id).map_err(|e| ApiError::InvalidId(e.to_string()))
    }

    /// Register a job and append it to the dispatch queue.
    ///
    /// Returns immediately; the job starts out `Queued`. Only fails once the
    /// dispatcher has been shut down.
    pub fn submit(&self, request: JobRequest) -> Result<JobId, ApiError> {
        let id = self.registry.create(request);

        if let Err(e) = self.dispatcher.enqueue(id) {
            self.registry.delete(id);
            return Err(e.into());
        }

        tracing::debug!("Job {} queued", id);
        Ok(id)
    }

    /// Follow a job's status.
    pub fn subscribe(&self, id: JobId) -> Result<StatusStream, ApiError> {
        let job = self.entry(id)?;
        let subscription = job.subscribe();
        Ok(StatusStream::new(job, subscription))
    }

    /// Schedule of a finished job.
    pub fn result(&self, id: JobId) -> Result<JobResult, ApiError> {
        let snapshot = self.job(id)?;
        match snapshot.result {
            Some(result) if snapshot.status == JobStatus::Done => Ok(result),
            _ => Err(ApiError::NotReady {
                id,
                status: snapshot.status,
            }),
        }
    }

    pub fn status(&self, id: JobId) -> Result<JobStatus, ApiError> {
        Ok(self.entry(id)?.status())
    }

    /// Consistent copy of a job.
    pub fn job(&self, id: JobId) -> Result<JobSnapshot, ApiError> {
        self.registry.snapshot(id).ok_or(ApiError::NotFound(id))
    }

    /// Forget a job. A job already being processed still runs to completion.
    pub fn delete(&self, id: JobId) -> Result<(), ApiError> {
        if self.registry.delete(id) {
            tracing::debug!("Job {} deleted", id);
            Ok(())
        } else {
            Err(ApiError::NotFound(id))
        }
    }

    /// Number of jobs currently held.
    pub fn job_count(&self) -> usize {
        self.registry.len()
    }

    /// Dispatcher counters. Waits for the job in flight, up to [`STATS_TIMEOUT`].
    pub async fn stats(&self) -> Result<DispatchStats, ApiError> {
        Ok(self.dispatcher.stats(STATS_TIMEOUT).await?)
    }

    /// Stop accepting work and wait for the dispatcher to exit.
    ///
    /// With `drain`, every job queued so far is processed first; otherwise
    /// only the job in flight finishes and the rest stay `Queued`. Either way,
    /// streams on jobs that will never run are ended once the dispatcher has
    /// exited.
    pub async fn shutdown(&self, drain: bool) -> Result<(), ApiError> {
        tracing::info!("Shutting down planner (drain: {})", drain);

        if drain {
            self.dispatcher.drain()?;
        } else {
            self.dispatcher.stop();
        }

        if let Some(task) = self.task.lock().await.take()
            && let Err(e) = task.await
        {
            tracing::warn!("Dispatcher task ended abnormally: {}", e);
        }

        let abandoned = self.registry.abandon_queued();
        if abandoned > 0 {
            tracing::info!("{} queued jobs will not run", abandoned);
        }

        Ok(())
    }

    fn entry(&self, id: JobId) -> Result<Arc<JobEntry>, ApiError> {
        self.registry.get(id).ok_or(ApiError::NotFound(id))
    }
}
