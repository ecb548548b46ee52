use maintenance::{bootstrap, seeding};
use salary_engine::{SalaryConfig, SalaryEvent};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let store = bootstrap("seed-salaries")?;
    let config = SalaryConfig::from_env()?;

    let events = seeding::seed_salaries(store, config).await?;
    for event in &events {
        if let SalaryEvent::BatchCompleted { event_id, processed_count, skipped_count, .. } = event {
            info!("Event {}: priced {}, skipped {}", event_id, processed_count, skipped_count);
        }
    }

    info!("Salary seeding completed!");
    Ok(())
}
