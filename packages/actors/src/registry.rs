//! Job registry: the authoritative map from job ID to job.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use planner_core::{JobId, JobRequest, JobSnapshot, JobStatus};

use crate::notify::JobEntry;

/// Thread-safe in-memory job store.
///
/// Jobs stay here until explicitly deleted; there is no eviction.
/// Deleting a job does not stop a dispatch already holding it.
#[derive(Default)]
pub struct JobRegistry {
    jobs: DashMap<JobId, Arc<JobEntry>>,
}

impl JobRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }

    /// Store a new queued job and return its ID.
    pub fn create(&self, request: JobRequest) -> JobId {
        loop {
            let id = JobId::new();
            if let Entry::Vacant(slot) = self.jobs.entry(id) {
                slot.insert(Arc::new(JobEntry::new(id, request)));
                return id;
            }
        }
    }

    /// Get a live handle to a job.
    pub fn get(&self, id: JobId) -> Option<Arc<JobEntry>> {
        self.jobs.get(&id).map(|entry| entry.value().clone())
    }

    /// Get a consistent copy of a job.
    pub fn snapshot(&self, id: JobId) -> Option<JobSnapshot> {
        self.get(id).map(|job| job.snapshot())
    }

    /// Remove a job. Returns whether it existed.
    ///
    /// Subscribers of a job that was still queued are released, since the
    /// dispatcher will skip it.
    pub fn delete(&self, id: JobId) -> bool {
        match self.jobs.remove(&id) {
            Some((_, job)) => {
                let released = job.abandon();
                if released > 0 {
                    tracing::debug!("Job {} deleted while queued, released {} subscribers", id, released);
                }
                true
            }
            None => false,
        }
    }

    /// Abandon every job that is still queued, ending its subscribers'
    /// streams. The jobs stay registered. Returns how many were abandoned.
    pub fn abandon_queued(&self) -> usize {
        let mut abandoned = 0;
        for job in self.jobs.iter() {
            if job.status() == JobStatus::Queued {
                job.abandon();
                abandoned += 1;
            }
        }
        abandoned
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
