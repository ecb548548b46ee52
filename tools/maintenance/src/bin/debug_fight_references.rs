use maintenance::{bootstrap, integrity};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let store = bootstrap("debug-fight-references")?;

    let report = integrity::debug_fight_references(store.as_ref()).await?;
    if report.is_clean() {
        info!("All fight references are consistent");
    } else {
        for (fight_id, event_id) in &report.orphaned_fights {
            warn!("Orphaned fight {} -> {}", fight_id, event_id);
        }
        for (event_id, fight_id) in &report.missing_card_fights {
            warn!("Event {} is missing fight {}", event_id, fight_id);
        }
    }
    Ok(())
}
