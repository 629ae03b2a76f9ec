//! Job lifecycle engine.
//!
//! This crate provides the in-memory job registry, per-job status
//! notification and the Ractor-based dispatcher.
//!
//! # Architecture
//!
//! - `JobRegistry` - Concurrent map of every known job
//! - `JobEntry` - One job's status, result and subscribers, under its own lock
//! - `Dispatcher` - Single actor draining the dispatch queue into the worker
//!
//! # Usage
//!
//! ```ignore
//! use actors::{JobRegistry, start_dispatcher};
//!
//! let registry = Arc::new(JobRegistry::new());
//! let (dispatcher, handle) = start_dispatcher(registry.clone(), backend).await?;
//!
//! let id = registry.create(request);
//! dispatcher.enqueue(id)?;
//! ```

mod dispatcher;
mod messages;
mod notify;
pub mod registry;

pub use dispatcher::{Dispatcher, DispatcherArgs, DispatcherHandle, start_dispatcher};
pub use messages::{ActorError, ActorResult, DispatchMessage, DispatchStats};
pub use notify::{JobEntry, SubscriberId, Subscription};
pub use registry::JobRegistry;
