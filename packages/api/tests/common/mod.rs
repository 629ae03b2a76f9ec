use std::sync::Arc;
use std::time::Duration;

use api::{JobId, JobStatus, PlannerConfig, PlannerService, init_planner};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use worker_bridge::wire::{
    self, WireJobRequest, WireJobResult, WirePeriod, WireReply, WireTaskAssignment,
    WireUserAssignment,
};

pub const WAIT: Duration = Duration::from_secs(5);

/// Every task goes to the first user; no users is a worker error.
fn first_user_plan(request: &WireJobRequest) -> WireReply {
    let Some(first) = request.users.first() else {
        return WireReply::Error {
            message: "no users to assign".into(),
        };
    };

    let periods = (1..=request.n_periods)
        .map(|period_number| WirePeriod {
            period_number,
            users: vec![WireUserAssignment {
                user_name: first.clone(),
                tasks: request
                    .tasks
                    .iter()
                    .map(|t| WireTaskAssignment {
                        label: t.label.clone(),
                        workload: t.workload,
                    })
                    .collect(),
            }],
        })
        .collect();

    WireReply::Schedule(WireJobResult { periods })
}

/// Start a worker that holds each reply until a permit is released.
pub async fn spawn_gated_worker() -> (String, Arc<Semaphore>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let permits = Arc::new(Semaphore::new(0));

    let gate = permits.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let gate = gate.clone();
            tokio::spawn(async move {
                let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
                while let Some(Ok(frame)) = framed.next().await {
                    match gate.acquire().await {
                        Ok(permit) => permit.forget(),
                        Err(_) => break,
                    }

                    let reply = match wire::decode_request(&frame) {
                        Ok(request) => first_user_plan(&request),
                        Err(e) => WireReply::Error {
                            message: e.to_string(),
                        },
                    };
                    let bytes = wire::encode_reply(&reply).unwrap();
                    if framed.send(Bytes::from(bytes)).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    (address, permits)
}

/// A planner wired to a gated fake worker.
pub struct Harness {
    pub service: PlannerService,
    pub permits: Arc<Semaphore>,
}

impl Harness {
    pub async fn start() -> Self {
        let (address, permits) = spawn_gated_worker().await;
        let config = PlannerConfig::default().with_worker_address(address);
        let service = init_planner(config).await.unwrap();
        Self { service, permits }
    }

    /// Let `n` more worker replies through.
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }

    pub async fn wait_for(&self, id: JobId, status: JobStatus) {
        let service = self.service.clone();
        tokio::time::timeout(WAIT, async move {
            loop {
                if service.status(id).ok() == Some(status) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("job {} never reached {}", id, status));
    }
}
