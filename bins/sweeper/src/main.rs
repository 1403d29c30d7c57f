//! Overdue sweep runner.
//!
//! Recomputes days overdue for every unsettled outstanding item using the
//! business-local date, then exits. Scheduling is left to cron or a similar
//! external trigger.
//!
//! Usage: cargo run --bin sweeper

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bahi_db::{OutstandingRepository, connect_with};
use bahi_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bahi=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let today = config.business.today().map_err(anyhow::Error::msg)?;

    let db = connect_with(&config.database).await?;
    info!(%today, timezone = %config.business.timezone, "Connected to database");

    let report = OutstandingRepository::new(db)
        .sweep_overdue(today, config.sweep.batch_size, config.sweep.max_retries)
        .await?;

    if report.conflicts > 0 {
        info!(conflicts = report.conflicts, "some items were left for the next sweep");
    }
    Ok(())
}
