use fantasy_store::{open_store, StoreConfig};
use salary_engine::{SalaryConfig, SalaryEngine, SalaryEvent};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting Salary Engine");

    let config = SalaryConfig::from_env()?;
    info!("Salary band: {}-{} (step {})", config.salary.floor, config.salary.ceiling, config.salary.step);

    let store_config = StoreConfig::from_env()?;
    let store = open_store(&store_config)?;

    let engine = SalaryEngine::new(config, store);

    match engine.price_upcoming().await {
        Ok(events) => {
            for event in &events {
                match event {
                    SalaryEvent::BatchCompleted { event_id, processed_count, skipped_count, .. } => {
                        info!(
                            "Event {}: priced {}, skipped {}",
                            event_id, processed_count, skipped_count
                        );
                    }
                    SalaryEvent::FighterSkipped { fighter_id, reason, .. } => {
                        info!("Skipped {}: {}", fighter_id, reason);
                    }
                    SalaryEvent::SalaryUpdated { .. } => {}
                }
            }
        }
        Err(e) => {
            error!("Failed to price upcoming events: {:#}", e);
            return Err(e);
        }
    }

    info!("Salary Engine processing completed!");
    Ok(())
}
