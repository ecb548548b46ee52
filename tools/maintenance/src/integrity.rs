//! Reference checks between events and fights. Reports only, never repairs.

use anyhow::Context;
use fantasy_store::{Collection, DocumentStore, EventDoc, FightDoc, StoreExt};
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    /// (fight id, event id it points at)
    pub orphaned_fights: Vec<(String, String)>,
    /// (event id, fight id on its card)
    pub missing_card_fights: Vec<(String, String)>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.orphaned_fights.is_empty() && self.missing_card_fights.is_empty()
    }
}

pub async fn debug_fight_references(store: &dyn DocumentStore) -> anyhow::Result<IntegrityReport> {
    let events: Vec<EventDoc> = store.list_docs(Collection::Events).await.context("Failed to load events")?;
    let fights: Vec<FightDoc> = store.list_docs(Collection::Fights).await.context("Failed to load fights")?;

    let event_ids: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();
    let fight_ids: HashSet<&str> = fights.iter().map(|f| f.id.as_str()).collect();

    let mut report = IntegrityReport::default();

    for fight in fights.iter().filter(|f| !event_ids.contains(f.event_id.as_str())) {
        warn!("Fight {} references missing event {}", fight.id, fight.event_id);
        report.orphaned_fights.push((fight.id.clone(), fight.event_id.clone()));
    }

    for event in &events {
        for fight_id in event.fight_ids.iter().filter(|id| !fight_ids.contains(id.as_str())) {
            warn!("Event {} ({}) lists missing fight {}", event.name, event.id, fight_id);
            report.missing_card_fights.push((event.id.clone(), fight_id.clone()));
        }
    }

    info!(
        "Checked {} events and {} fights: {} orphaned fights, {} missing card fights",
        events.len(),
        fights.len(),
        report.orphaned_fights.len(),
        report.missing_card_fights.len()
    );
    Ok(report)
}
