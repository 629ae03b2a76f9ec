//! Inbound API of the chore planner.
//!
//! This crate contains everything an HTTP adapter needs:
//! - `PlannerService` for submit, status, result and delete
//! - Real-time status streams and SSE framing
//! - Configuration and startup

mod config;
mod error;
mod init;
mod realtime;
mod service;

pub use config::{CONNECT_ON_START_ENV, PlannerConfig, WORKER_ADDR_ENV};
pub use error::{ApiError, ErrorBody};
pub use init::init_planner;
pub use realtime::{StatusStream, format_sse_event, sse_stream};
pub use service::{PlannerService, STATS_TIMEOUT};

// Re-export core types for convenience
pub use actors::DispatchStats;
pub use planner_core::{
    JobId, JobRequest, JobResult, JobSnapshot, JobStatus, PeriodSchedule, TaskAssignment,
    TaskDef, UserAssignment,
};
