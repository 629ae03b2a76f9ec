use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use worker_bridge::wire::{
    self, WireJobRequest, WireJobResult, WirePeriod, WireReply, WireTaskAssignment,
    WireUserAssignment,
};

/// What the fake worker observed while serving.
#[derive(Default)]
pub struct WorkerLog {
    pub requests: AtomicUsize,
    pub connections: AtomicUsize,
    pub pipelined: AtomicBool,
}

/// Round-robin planner: task `t` in period `p` goes to user `(p - 1 + t) % users`.
pub fn alternating_plan(request: &WireJobRequest) -> WireReply {
    if request.users.is_empty() {
        return WireReply::Error {
            message: "no users to assign".into(),
        };
    }

    let periods = (1..=request.n_periods)
        .map(|period_number| {
            let mut users: Vec<WireUserAssignment> = request
                .users
                .iter()
                .map(|name| WireUserAssignment {
                    user_name: name.clone(),
                    tasks: Vec::new(),
                })
                .collect();

            for (t, task) in request.tasks.iter().enumerate() {
                let slot = (period_number as usize - 1 + t) % users.len();
                users[slot].tasks.push(WireTaskAssignment {
                    label: task.label.clone(),
                    workload: task.workload,
                });
            }

            WirePeriod {
                period_number,
                users,
            }
        })
        .collect();

    WireReply::Schedule(WireJobResult { periods })
}

/// Start a worker that answers each request with `plan`, after `delay`.
///
/// Returns the address to connect to and the log of what it saw. The worker
/// flags `pipelined` if a second request arrives before it has replied.
pub async fn spawn_worker<F>(delay: Duration, plan: F) -> (String, Arc<WorkerLog>)
where
    F: Fn(&WireJobRequest) -> WireReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let log = Arc::new(WorkerLog::default());
    let plan = Arc::new(plan);

    let worker_log = log.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            worker_log.connections.fetch_add(1, Ordering::SeqCst);
            let log = worker_log.clone();
            let plan = plan.clone();

            tokio::spawn(async move {
                let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
                while let Some(Ok(frame)) = framed.next().await {
                    log.requests.fetch_add(1, Ordering::SeqCst);

                    if !delay.is_zero()
                        && let Ok(Some(_)) = tokio::time::timeout(delay, framed.next()).await
                    {
                        log.pipelined.store(true, Ordering::SeqCst);
                    }

                    let reply = match wire::decode_request(&frame) {
                        Ok(request) => plan(&request),
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

    (address, log)
}

/// Start a worker that reads one request and answers with raw `bytes`.
pub async fn spawn_raw_worker(bytes: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
            while let Some(Ok(_)) = framed.next().await {
                if framed.send(Bytes::from(bytes.clone())).await.is_err() {
                    break;
                }
            }
        }
    });

    address
}

/// Start a worker that accepts one connection, reads one request and hangs up.
pub async fn spawn_hangup_worker() -> (String, Arc<WorkerLog>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let log = Arc::new(WorkerLog::default());

    let worker_log = log.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            worker_log.connections.fetch_add(1, Ordering::SeqCst);
            let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
            if framed.next().await.is_some() {
                worker_log.requests.fetch_add(1, Ordering::SeqCst);
            }
            drop(framed);
        }
    });

    (address, log)
}
