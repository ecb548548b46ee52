use anyhow::Context;
use chrono::{DateTime, Utc};
use fantasy_store::{Collection, DocumentStore, EventDoc, EventStatus, StoreExt, WriteBatch};
use tracing::info;

/// Move every upcoming event dated before `now` to completed, in one batch.
/// Returns the ids that changed. Completed events are never reopened.
pub async fn fix_event_statuses(store: &dyn DocumentStore, now: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
    let events: Vec<EventDoc> = store.list_docs(Collection::Events).await.context("Failed to load events")?;

    let mut batch = WriteBatch::new();
    let mut updated = Vec::new();
    for mut event in events.into_iter().filter(|e| e.is_upcoming() && e.date < now) {
        info!("Marking {} ({}) completed, dated {}", event.name, event.id, event.date);
        event.status = EventStatus::Completed;
        batch.set(Collection::Events, event.id.clone(), &event)?;
        updated.push(event.id);
    }

    if !batch.is_empty() {
        store.commit(batch).await.context("Failed to update event statuses")?;
    }
    info!("Updated {} event statuses", updated.len());
    Ok(updated)
}
