use chrono::Utc;
use maintenance::{bootstrap, status};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let store = bootstrap("fix-event-statuses")?;

    let updated = status::fix_event_statuses(store.as_ref(), Utc::now()).await?;
    info!("Event status fix completed, {} events updated", updated.len());
    Ok(())
}
