use std::sync::{Arc, Mutex};
use std::time::Duration;

use actors::{DispatcherHandle, JobRegistry, start_dispatcher};
use planner_core::{JobId, JobRequest, JobResult, JobStatus, PeriodSchedule};
use tokio::sync::Semaphore;
use worker_bridge::{BridgeError, ComputeBackend, FnBackend};

pub const WAIT: Duration = Duration::from_secs(5);

/// Controls a backend that blocks every computation until released.
///
/// Requests are identified by their `n_periods`; a request with zero periods
/// fails.
#[derive(Clone)]
pub struct Gate {
    permits: Arc<Semaphore>,
    seen: Arc<Mutex<Vec<u32>>>,
}

impl Gate {
    /// Let `n` more computations finish.
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }

    /// `n_periods` of every request that reached the backend, in order.
    pub fn seen(&self) -> Vec<u32> {
        self.seen.lock().unwrap().clone()
    }
}

pub fn gated_backend() -> (Arc<dyn ComputeBackend>, Gate) {
    let gate = Gate {
        permits: Arc::new(Semaphore::new(0)),
        seen: Arc::new(Mutex::new(Vec::new())),
    };

    let control = gate.clone();
    let backend = FnBackend::new("gated", move |request: JobRequest| {
        let gate = control.clone();
        Box::pin(async move {
            gate.seen.lock().unwrap().push(request.n_periods);
            match gate.permits.acquire().await {
                Ok(permit) => permit.forget(),
                Err(e) => return Err(BridgeError::Worker(e.to_string())),
            }

            if request.n_periods == 0 {
                return Err(BridgeError::Worker("nothing to plan".into()));
            }
            Ok(JobResult {
                periods: (1..=request.n_periods)
                    .map(|period_number| PeriodSchedule {
                        period_number,
                        users: vec![],
                    })
                    .collect(),
            })
        })
    });

    (Arc::new(backend), gate)
}

pub struct Harness {
    pub registry: Arc<JobRegistry>,
    pub dispatcher: DispatcherHandle,
    pub handle: tokio::task::JoinHandle<()>,
    pub gate: Gate,
}

impl Harness {
    pub async fn start() -> Self {
        let registry = Arc::new(JobRegistry::new());
        let (backend, gate) = gated_backend();
        let (dispatcher, handle) = start_dispatcher(registry.clone(), backend).await.unwrap();
        Self {
            registry,
            dispatcher,
            handle,
            gate,
        }
    }

    pub fn submit(&self, n_periods: u32) -> JobId {
        let id = self.registry.create(JobRequest::new(n_periods).with_users(["Ana", "Ben"]));
        self.dispatcher.enqueue(id).unwrap();
        id
    }

    /// Wait until the job reaches `status`.
    pub async fn wait_for(&self, id: JobId, status: JobStatus) {
        let job = self.registry.get(id).unwrap();
        tokio::time::timeout(WAIT, async {
            while job.status() != status {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("job {id} never reached {status}, stuck at {}", job.status()));
    }
}
