use chrono::Utc;
use maintenance::{bootstrap, seeding};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let store = bootstrap("seed-leagues")?;

    let report = seeding::seed_leagues(store.as_ref(), Utc::now()).await?;
    for id in &report.created {
        info!("Created league {}", id);
    }

    info!("League seeding completed!");
    Ok(())
}
