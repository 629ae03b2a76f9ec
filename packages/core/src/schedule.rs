//! Planning request and schedule result types.
//!
//! These are the opaque payloads of a job: the engine stores them verbatim and
//! only the worker interprets them.

use serde::{Deserialize, Serialize};

/// A recurring chore to distribute across users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDef {
    pub label: String,
    /// How many times per period the task occurs.
    pub frequency: u32,
    /// Effort units charged to whoever is assigned the task.
    pub workload: u32,
    /// Never give the task to the same user in consecutive periods.
    #[serde(default)]
    pub force_alternation: bool,
}

impl TaskDef {
    pub fn new(label: impl Into<String>, frequency: u32, workload: u32) -> Self {
        Self {
            label: label.into(),
            frequency,
            workload,
            force_alternation: false,
        }
    }

    /// Require alternation between users for this task.
    pub fn alternating(mut self) -> Self {
        self.force_alternation = true;
        self
    }
}

/// Input of a planning job, captured at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    #[serde(default)]
    pub tasks: Vec<TaskDef>,
    #[serde(default)]
    pub users: Vec<String>,
    pub n_periods: u32,
}

impl JobRequest {
    pub fn new(n_periods: u32) -> Self {
        Self {
            n_periods,
            ..Default::default()
        }
    }

    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users = users.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_task(mut self, task: TaskDef) -> Self {
        self.tasks.push(task);
        self
    }
}

/// One task handed to one user within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    pub label: String,
    pub workload: u32,
}

/// Everything assigned to a single user within a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignment {
    pub user_name: String,
    #[serde(default)]
    pub tasks: Vec<TaskAssignment>,
}

impl UserAssignment {
    /// Sum of the workload of every task assigned to this user.
    pub fn total_workload(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.workload)).sum()
    }
}

/// Assignments for one planning period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSchedule {
    pub period_number: u32,
    #[serde(default)]
    pub users: Vec<UserAssignment>,
}

/// Schedule produced by the worker for a completed job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    #[serde(default)]
    pub periods: Vec<PeriodSchedule>,
}

impl JobResult {
    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    /// Number of user assignments across all periods.
    pub fn user_count(&self) -> usize {
        self.periods.iter().map(|p| p.users.len()).sum()
    }

    /// Number of task assignments across all periods and users.
    pub fn task_count(&self) -> usize {
        self.periods
            .iter()
            .flat_map(|p| &p.users)
            .map(|u| u.tasks.len())
            .sum()
    }
}
