//! Server initialization for the planner.

use std::sync::Arc;

use worker_bridge::WorkerClient;

use crate::config::PlannerConfig;
use crate::error::ApiError;
use crate::service::PlannerService;

/// Initialize the planner.
///
/// This should be called once at server startup; the returned service is
/// handed to whatever serves inbound requests.
pub async fn init_planner(config: PlannerConfig) -> Result<PlannerService, ApiError> {
    tracing::info!("Initializing planner...");

    let client = if config.connect_on_start {
        WorkerClient::connect(config.worker_address.as_str()).await?
    } else {
        tracing::info!("Worker {} will be connected on first job", config.worker_address);
        WorkerClient::new(config.worker_address.as_str())
    };

    let service = PlannerService::start(Arc::new(client)).await?;

    tracing::info!("Planner initialized");
    Ok(service)
}
