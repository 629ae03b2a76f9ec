//! Core domain types for the chore planner job engine.
//!
//! This crate contains shared types used across all packages:
//! - Job, JobId and JobStatus for the job lifecycle
//! - JobRequest and JobResult for the planning payloads
//! - StatusEvent for real-time updates

mod error;
mod events;
mod job;
mod schedule;

pub use error::CoreError;
pub use events::StatusEvent;
pub use job::{JobId, JobSnapshot, JobStatus};
pub use schedule::{JobRequest, JobResult, PeriodSchedule, TaskAssignment, TaskDef, UserAssignment};
