//! Live job status streams.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use actors::{JobEntry, SubscriberId, Subscription};
use futures_util::{Stream, StreamExt};
use planner_core::{JobStatus, StatusEvent};
use tokio::sync::mpsc;

/// Stream of a job's statuses.
///
/// Yields the status current at subscription time, then every later
/// transition, and ends after `Done` or `Failed`. It also ends if the job is
/// deleted before it started. Dropping the stream unsubscribes.
pub struct StatusStream {
    job: Arc<JobEntry>,
    subscriber: Option<SubscriberId>,
    current: Option<JobStatus>,
    updates: Option<mpsc::UnboundedReceiver<StatusEvent>>,
}

impl StatusStream {
    pub(crate) fn new(job: Arc<JobEntry>, subscription: Subscription) -> Self {
        Self {
            job,
            subscriber: subscription.id,
            current: Some(subscription.current.status),
            updates: subscription.updates,
        }
    }

    /// Whether the stream has delivered its last status.
    pub fn is_finished(&self) -> bool {
        self.current.is_none() && self.updates.is_none()
    }

    fn finish(&mut self) {
        self.updates = None;
        if let Some(id) = self.subscriber.take() {
            self.job.unsubscribe(id);
        }
    }
}

impl Stream for StatusStream {
    type Item = JobStatus;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(status) = this.current.take() {
            if status.is_terminal() {
                this.finish();
            }
            return Poll::Ready(Some(status));
        }

        let Some(updates) = this.updates.as_mut() else {
            return Poll::Ready(None);
        };

        match updates.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    this.finish();
                }
                Poll::Ready(Some(event.status))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for StatusStream {
    fn drop(&mut self) {
        self.finish();
    }
}

impl std::fmt::Debug for StatusStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusStream")
            .field("job", &self.job.id())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Helper to format a status for SSE.
pub fn format_sse_event(status: JobStatus) -> String {
    format!("data: {}\n\n", status)
}

/// Turn a status stream into SSE frames, one per transition.
pub fn sse_stream(statuses: StatusStream) -> impl Stream<Item = String> + Send {
    statuses.map(format_sse_event)
}
