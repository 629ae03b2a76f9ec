//! Compute backend trait and adapters.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use planner_core::{JobRequest, JobResult};

use crate::error::BridgeError;

/// Result type for compute backends.
pub type ComputeResult = Result<JobResult, BridgeError>;

/// Future type for async compute backends.
pub type ComputeFuture<'a> = Pin<Box<dyn Future<Output = ComputeResult> + Send + 'a>>;

/// Something that turns a planning request into a schedule.
///
/// Implementations know nothing about jobs; they map one request to one
/// result or failure.
pub trait ComputeBackend: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Compute the schedule for a request.
    fn compute<'a>(&'a self, request: &'a JobRequest) -> ComputeFuture<'a>;
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn compute<'a>(&'a self, request: &'a JobRequest) -> ComputeFuture<'a> {
        (**self).compute(request)
    }
}

/// A simple function-based backend.
pub struct FnBackend<F>
where
    F: Fn(JobRequest) -> ComputeFuture<'static> + Send + Sync + 'static,
{
    name: String,
    compute: F,
}

impl<F> FnBackend<F>
where
    F: Fn(JobRequest) -> ComputeFuture<'static> + Send + Sync + 'static,
{
    /// Create a new function-based backend.
    pub fn new(name: impl Into<String>, compute: F) -> Self {
        Self {
            name: name.into(),
            compute,
        }
    }
}

impl<F> ComputeBackend for FnBackend<F>
where
    F: Fn(JobRequest) -> ComputeFuture<'static> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn compute<'a>(&'a self, request: &'a JobRequest) -> ComputeFuture<'a> {
        (self.compute)(request.clone())
    }
}

/// Helper macro for creating compute backends from async closures.
#[macro_export]
macro_rules! compute_backend {
    ($name:expr, |$request:ident| $body:expr) => {
        $crate::FnBackend::new($name, |$request: $crate::JobRequest| {
            ::std::boxed::Box::pin(async move {
                let result: $crate::ComputeResult = $body;
                result
            })
        })
    };
}
