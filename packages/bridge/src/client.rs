//! Request/reply client for the external planning worker.

use bytes::{Bytes, BytesMut};
use futures_util::{SinkExt, StreamExt};
use planner_core::{JobRequest, JobResult};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::backend::{ComputeBackend, ComputeFuture};
use crate::error::{BridgeError, BridgeResult};
use crate::wire::{self, MAX_FRAME_LEN, WireJobRequest, WireReply};

type Connection = Framed<TcpStream, LengthDelimitedCodec>;

const EXCHANGE_CANCELLED: &str = "exchange cancelled before the reply arrived";

/// State of the single connection to the worker.
enum Link {
    /// Not connected yet, or the last connect attempt failed.
    Idle,
    Connected(Connection),
    /// An exchange failed mid-way; the alternation can't be trusted anymore.
    Broken(String),
}

/// Client for the external worker.
///
/// All exchanges share one connection and are strictly serialized: a request
/// is only sent once the previous reply has been read. Concurrent callers wait
/// on the connection lock. There is no timeout and no automatic reconnect
/// after a connection breaks.
pub struct WorkerClient {
    address: String,
    link: Mutex<Link>,
}

impl WorkerClient {
    /// Create a client that connects on first use.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            link: Mutex::new(Link::Idle),
        }
    }

    /// Create a client and open its connection right away.
    pub async fn connect(address: impl Into<String>) -> BridgeResult<Self> {
        let client = Self::new(address);
        let connection = open(&client.address).await?;
        *client.link.lock().await = Link::Connected(connection);
        Ok(client)
    }

    /// Whether the connection has failed and will no longer be used.
    pub async fn is_broken(&self) -> bool {
        matches!(*self.link.lock().await, Link::Broken(_))
    }

    /// Send a planning request and wait for the worker's schedule.
    pub async fn compute(&self, request: &JobRequest) -> BridgeResult<JobResult> {
        let payload = wire::encode_request(&WireJobRequest::from(request))?;
        let reply = self.exchange(Bytes::from(payload)).await?;

        match wire::decode_reply(&reply)? {
            WireReply::Schedule(result) => Ok(result.into()),
            WireReply::Error { message } => Err(BridgeError::Worker(message)),
        }
    }

    /// Exchange exactly one request frame for one reply frame.
    async fn exchange(&self, payload: Bytes) -> BridgeResult<BytesMut> {
        let mut link = self.link.lock().await;

        if let Link::Broken(reason) = &*link {
            return Err(BridgeError::ConnectionBroken(reason.clone()));
        }
        if matches!(*link, Link::Idle) {
            *link = Link::Connected(open(&self.address).await?);
        }

        // Until the reply is read the link counts as broken, so an exchange
        // dropped mid-way never lets the next request read its reply.
        let Link::Connected(mut connection) =
            std::mem::replace(&mut *link, Link::Broken(EXCHANGE_CANCELLED.to_string()))
        else {
            return Err(BridgeError::ConnectionClosed);
        };

        let result = round_trip(&mut connection, payload).await;

        match &result {
            Err(e) if e.breaks_connection() => {
                tracing::warn!("Worker connection to {} broken: {}", self.address, e);
                *link = Link::Broken(e.to_string());
            }
            _ => *link = Link::Connected(connection),
        }

        result
    }
}

async fn open(address: &str) -> BridgeResult<Connection> {
    tracing::info!("Connecting to worker: {}", address);

    let stream = TcpStream::connect(address)
        .await
        .map_err(|source| BridgeError::Connect {
            address: address.to_string(),
            source,
        })?;
    stream.set_nodelay(true)?;

    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LEN)
        .new_codec();

    Ok(Framed::new(stream, codec))
}

async fn round_trip(connection: &mut Connection, payload: Bytes) -> BridgeResult<BytesMut> {
    connection.send(payload).await?;

    match connection.next().await {
        Some(frame) => Ok(frame?),
        None => Err(BridgeError::ConnectionClosed),
    }
}

impl ComputeBackend for WorkerClient {
    fn name(&self) -> &str {
        &self.address
    }

    fn compute<'a>(&'a self, request: &'a JobRequest) -> ComputeFuture<'a> {
        Box::pin(WorkerClient::compute(self, request))
    }
}
