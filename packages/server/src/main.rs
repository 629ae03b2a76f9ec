use api::{PlannerConfig, init_planner};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let config = PlannerConfig::from_env()?;
    tracing::info!("Worker address: {}", config.worker_address);

    let service = init_planner(config).await?;
    tracing::info!("Chore planner ready, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;

    if let Ok(stats) = service.stats().await {
        tracing::info!("Dispatch stats: {:?}", stats);
    }
    service.shutdown(false).await?;
    tracing::info!("Stopped with {} jobs held", service.job_count());

    Ok(())
}
