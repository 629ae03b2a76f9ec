//! Dispatcher actor that drives queued jobs through the worker.

use std::sync::Arc;
use std::time::Duration;

use planner_core::{CoreError, JobId};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use worker_bridge::ComputeBackend;

use crate::messages::{ActorError, ActorResult, DispatchMessage, DispatchStats};
use crate::registry::JobRegistry;

/// Dispatcher actor arguments.
pub struct DispatcherArgs {
    pub registry: Arc<JobRegistry>,
    pub backend: Arc<dyn ComputeBackend>,
}

/// State for the dispatcher actor.
pub struct DispatcherState {
    registry: Arc<JobRegistry>,
    backend: Arc<dyn ComputeBackend>,
    stats: DispatchStats,
}

impl DispatcherState {
    pub fn new(args: DispatcherArgs) -> Self {
        Self {
            registry: args.registry,
            backend: args.backend,
            stats: DispatchStats::default(),
        }
    }

    /// Run one job to a terminal status.
    async fn process(&mut self, job_id: JobId) {
        let Some(job) = self.registry.get(job_id) else {
            tracing::debug!("Job {} was deleted while queued, skipping", job_id);
            self.stats.skipped += 1;
            return;
        };

        match job.mark_processing() {
            Ok(_) => {}
            Err(CoreError::Abandoned(_)) => {
                tracing::debug!("Job {} was deleted while queued, skipping", job_id);
                self.stats.skipped += 1;
                return;
            }
            Err(e) => {
                tracing::warn!("Job {} cannot be dispatched: {}", job_id, e);
                self.stats.skipped += 1;
                return;
            }
        }
        tracing::debug!("Job {} -> Processing on {}", job_id, self.backend.name());

        let published = match self.backend.compute(job.request()).await {
            Ok(result) => {
                self.stats.completed += 1;
                job.complete(result)
            }
            Err(e) => {
                tracing::error!("Job {} failed: {}", job_id, e);
                self.stats.failed += 1;
                job.fail()
            }
        };
        self.stats.processed += 1;

        match published {
            Ok(delivered) => {
                tracing::debug!("Job {} -> {} ({} subscribers)", job_id, job.status(), delivered)
            }
            Err(e) => tracing::warn!("Job {} final transition rejected: {}", job_id, e),
        }
    }
}

/// Single consumer of the dispatch queue.
///
/// Jobs are processed strictly one after another in submission order, so at
/// most one request is ever outstanding against the worker.
pub struct Dispatcher;

impl Actor for Dispatcher {
    type Msg = DispatchMessage;
    type State = DispatcherState;
    type Arguments = DispatcherArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting dispatcher for worker {}", args.backend.name());
        Ok(DispatcherState::new(args))
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DispatchMessage::Process(job_id) => {
                state.process(job_id).await;
            }

            DispatchMessage::GetStats { reply } => {
                let _ = reply.send(state.stats.clone());
            }

            DispatchMessage::Shutdown => {
                tracing::info!("Shutting down dispatcher");
                myself.stop(None);
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        tracing::info!(
            "Dispatcher stopped: {} processed, {} failed, {} skipped",
            state.stats.processed,
            state.stats.failed,
            state.stats.skipped
        );
        Ok(())
    }
}

/// Cloneable handle to a running dispatcher.
#[derive(Clone)]
pub struct DispatcherHandle {
    actor: ActorRef<DispatchMessage>,
}

impl DispatcherHandle {
    /// Append a job to the dispatch queue. Never blocks.
    pub fn enqueue(&self, job_id: JobId) -> ActorResult<()> {
        self.actor
            .send_message(DispatchMessage::Process(job_id))
            .map_err(|e| ActorError::Messaging(e.to_string()))
    }

    /// Fetch dispatch counters, waiting at most `timeout` for the current
    /// job to finish.
    pub async fn stats(&self, timeout: Duration) -> ActorResult<DispatchStats> {
        let result = ractor::rpc::call(
            &self.actor,
            |reply| DispatchMessage::GetStats { reply },
            Some(timeout),
        )
        .await
        .map_err(|e| ActorError::Messaging(e.to_string()))?;

        match result {
            ractor::rpc::CallResult::Success(stats) => Ok(stats),
            ractor::rpc::CallResult::Timeout => Err(ActorError::Timeout),
            ractor::rpc::CallResult::SenderError => {
                Err(ActorError::Messaging("reply channel dropped".into()))
            }
        }
    }

    /// Stop once every job queued so far has been processed.
    pub fn drain(&self) -> ActorResult<()> {
        self.actor
            .send_message(DispatchMessage::Shutdown)
            .map_err(|e| ActorError::Messaging(e.to_string()))
    }

    /// Stop after the job in flight, dropping the rest of the queue.
    pub fn stop(&self) {
        self.actor.stop(Some("stop requested".to_string()));
    }
}

/// Start a dispatcher over `registry`, computing with `backend`.
pub async fn start_dispatcher(
    registry: Arc<JobRegistry>,
    backend: Arc<dyn ComputeBackend>,
) -> ActorResult<(DispatcherHandle, tokio::task::JoinHandle<()>)> {
    let (actor, handle) =
        Actor::spawn(None, Dispatcher, DispatcherArgs { registry, backend }).await?;

    Ok((DispatcherHandle { actor }, handle))
}
