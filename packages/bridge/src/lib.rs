//! Bridge to the external planning worker.
//!
//! The worker is a separate process reached over one long-lived TCP
//! connection. Every planning request is answered by exactly one reply;
//! [`WorkerClient`] enforces that alternation for the whole process.
//!
//! # Usage
//!
//! ```ignore
//! use worker_bridge::WorkerClient;
//!
//! let client = WorkerClient::new("127.0.0.1:5555");
//! let schedule = client.compute(&request).await?;
//! ```

mod backend;
mod client;
mod error;
pub mod wire;

pub use backend::{ComputeBackend, ComputeFuture, ComputeResult, FnBackend};
pub use client::WorkerClient;
pub use error::{BridgeError, BridgeResult};

/// Re-export the request type used by [`compute_backend!`].
pub use planner_core::JobRequest;
