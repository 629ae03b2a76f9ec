//! Wire schema spoken with the external worker.
//!
//! Each message is a single length-delimited frame whose payload is the
//! bincode encoding (varint integers, no trailing bytes) of one of the types
//! below. The worker answers every [`WireJobRequest`] with exactly one
//! [`WireReply`].

use bincode::Options;
use planner_core::{JobRequest, JobResult, PeriodSchedule, TaskAssignment, TaskDef, UserAssignment};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::{BridgeError, BridgeResult};

/// Largest frame accepted in either direction.
pub const MAX_FRAME_LEN: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTaskDef {
    pub label: String,
    pub frequency: u32,
    pub workload: u32,
    pub force_alternation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireJobRequest {
    pub n_periods: u32,
    pub users: Vec<String>,
    pub tasks: Vec<WireTaskDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTaskAssignment {
    pub label: String,
    pub workload: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireUserAssignment {
    pub user_name: String,
    pub tasks: Vec<WireTaskAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePeriod {
    pub period_number: u32,
    pub users: Vec<WireUserAssignment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireJobResult {
    pub periods: Vec<WirePeriod>,
}

/// The worker's answer to one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireReply {
    Schedule(WireJobResult),
    Error { message: String },
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(MAX_FRAME_LEN as u64)
        .reject_trailing_bytes()
}

fn encode<T: Serialize>(value: &T) -> BridgeResult<Vec<u8>> {
    options()
        .serialize(value)
        .map_err(|e| BridgeError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> BridgeResult<T> {
    options()
        .deserialize(bytes)
        .map_err(|e| BridgeError::Decode(e.to_string()))
}

pub fn encode_request(request: &WireJobRequest) -> BridgeResult<Vec<u8>> {
    encode(request)
}

pub fn decode_request(bytes: &[u8]) -> BridgeResult<WireJobRequest> {
    decode(bytes)
}

pub fn encode_reply(reply: &WireReply) -> BridgeResult<Vec<u8>> {
    encode(reply)
}

pub fn decode_reply(bytes: &[u8]) -> BridgeResult<WireReply> {
    decode(bytes)
}

impl From<&TaskDef> for WireTaskDef {
    fn from(task: &TaskDef) -> Self {
        Self {
            label: task.label.clone(),
            frequency: task.frequency,
            workload: task.workload,
            force_alternation: task.force_alternation,
        }
    }
}

impl From<WireTaskDef> for TaskDef {
    fn from(task: WireTaskDef) -> Self {
        Self {
            label: task.label,
            frequency: task.frequency,
            workload: task.workload,
            force_alternation: task.force_alternation,
        }
    }
}

impl From<&JobRequest> for WireJobRequest {
    fn from(request: &JobRequest) -> Self {
        Self {
            n_periods: request.n_periods,
            users: request.users.clone(),
            tasks: request.tasks.iter().map(WireTaskDef::from).collect(),
        }
    }
}

impl From<WireJobRequest> for JobRequest {
    fn from(request: WireJobRequest) -> Self {
        Self {
            tasks: request.tasks.into_iter().map(TaskDef::from).collect(),
            users: request.users,
            n_periods: request.n_periods,
        }
    }
}

impl From<WireJobResult> for JobResult {
    fn from(result: WireJobResult) -> Self {
        let periods = result
            .periods
            .into_iter()
            .map(|period| PeriodSchedule {
                period_number: period.period_number,
                users: period
                    .users
                    .into_iter()
                    .map(|user| UserAssignment {
                        user_name: user.user_name,
                        tasks: user
                            .tasks
                            .into_iter()
                            .map(|task| TaskAssignment {
                                label: task.label,
                                workload: task.workload,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self { periods }
    }
}

impl From<&JobResult> for WireJobResult {
    fn from(result: &JobResult) -> Self {
        let periods = result
            .periods
            .iter()
            .map(|period| WirePeriod {
                period_number: period.period_number,
                users: period
                    .users
                    .iter()
                    .map(|user| WireUserAssignment {
                        user_name: user.user_name.clone(),
                        tasks: user
                            .tasks
                            .iter()
                            .map(|task| WireTaskAssignment {
                                label: task.label.clone(),
                                workload: task.workload,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self { periods }
    }
}
