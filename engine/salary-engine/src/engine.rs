use anyhow::Context;
use chrono::Utc;
use fantasy_store::{
    Collection, DocumentStore, EventDoc, FightDoc, FighterDoc, SalaryDoc, StoreExt, WriteBatch,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    calculator::SalaryCalculator,
    config::SalaryConfig,
    models::{FighterProfile, SalaryEvent},
};

pub struct SalaryEngine {
    calculator: SalaryCalculator,
    store: Arc<dyn DocumentStore>,
}

impl SalaryEngine {
    pub fn new(config: SalaryConfig, store: Arc<dyn DocumentStore>) -> Self {
        info!("Creating Salary Engine on {} store", store.name());
        Self { calculator: SalaryCalculator::new(config), store }
    }

    pub fn calculator(&self) -> &SalaryCalculator {
        &self.calculator
    }

    /// Fights on an event's card: documents pointing at the event plus any
    /// ids the event lists itself
    async fn card_fights(&self, event: &EventDoc) -> anyhow::Result<Vec<FightDoc>> {
        let mut fights: Vec<FightDoc> = self
            .store
            .list_docs::<FightDoc>(Collection::Fights)
            .await
            .context("Failed to load fights")?
            .into_iter()
            .filter(|f| f.event_id == event.id)
            .collect();

        let known: HashSet<String> = fights.iter().map(|f| f.id.clone()).collect();
        for fight_id in event.fight_ids.iter().filter(|id| !known.contains(*id)) {
            match self.store.get_doc::<FightDoc>(Collection::Fights, fight_id).await {
                Ok(Some(fight)) => fights.push(fight),
                Ok(None) => warn!("Event {} lists missing fight {}", event.id, fight_id),
                Err(e) => error!("Failed to load fight {} for event {}: {}", fight_id, event.id, e),
            }
        }
        Ok(fights)
    }

    /// Price every fighter on one event card and write all salaries in one batch
    pub async fn price_event(&self, event_id: &str) -> anyhow::Result<Vec<SalaryEvent>> {
        let event: EventDoc = self
            .store
            .require_doc(Collection::Events, event_id)
            .await
            .with_context(|| format!("Failed to load event {event_id}"))?;

        let fights = self.card_fights(&event).await?;
        info!("Pricing {} fights for event {} ({})", fights.len(), event.name, event.id);

        let mut events = Vec::new();
        let mut batch = WriteBatch::new();
        let mut processed_count = 0;
        let mut skipped_count = 0;

        for fight in &fights {
            for fighter_id in [&fight.fighter_a, &fight.fighter_b] {
                let skip_reason = match self.store.get_doc::<FighterDoc>(Collection::Fighters, fighter_id).await {
                    Ok(Some(fighter)) => {
                        let Some((_, own_odds, opponent_odds)) = fight.matchup_for(fighter_id) else {
                            continue;
                        };
                        let quote = self.calculator.calculate(
                            &FighterProfile::from(&fighter),
                            own_odds,
                            opponent_odds,
                        );

                        let doc_id = SalaryDoc::doc_id(&event.id, fighter_id);
                        let previous = match self.store.get_doc::<SalaryDoc>(Collection::Salaries, &doc_id).await {
                            Ok(doc) => doc.map(|d| d.salary),
                            Err(e) => {
                                warn!("Ignoring unreadable salary {}: {}", doc_id, e);
                                None
                            }
                        };

                        let doc = SalaryDoc {
                            event_id: event.id.clone(),
                            fighter_id: fighter_id.clone(),
                            salary: quote.salary,
                            factors: quote.factors.into(),
                            calculated_at: Utc::now(),
                        };
                        batch.set(Collection::Salaries, doc_id, &doc)?;

                        info!("Salary for {} ({}): {}", fighter.name, fighter_id, quote.salary);
                        events.push(SalaryEvent::SalaryUpdated {
                            event_id: event.id.clone(),
                            fighter_id: fighter_id.clone(),
                            salary: quote.salary,
                            previous,
                            timestamp: Utc::now(),
                        });
                        processed_count += 1;
                        None
                    }
                    Ok(None) => Some("fighter document not found".to_string()),
                    Err(e) => Some(format!("failed to load fighter: {e}")),
                };

                if let Some(reason) = skip_reason {
                    warn!("Skipping fighter {} on fight {}: {}", fighter_id, fight.id, reason);
                    skipped_count += 1;
                    events.push(SalaryEvent::FighterSkipped {
                        event_id: event.id.clone(),
                        fighter_id: fighter_id.clone(),
                        reason,
                        timestamp: Utc::now(),
                    });
                }
            }
        }

        let written = self.store.commit(batch).await.context("Failed to store salaries")?;
        info!("Stored {} salaries for event {}", written, event.id);

        events.push(SalaryEvent::BatchCompleted {
            event_id: event.id.clone(),
            processed_count,
            skipped_count,
            timestamp: Utc::now(),
        });
        Ok(events)
    }

    /// Price every upcoming event. A failing event is logged and skipped.
    pub async fn price_upcoming(&self) -> anyhow::Result<Vec<SalaryEvent>> {
        let upcoming: Vec<EventDoc> = self
            .store
            .list_docs::<EventDoc>(Collection::Events)
            .await
            .context("Failed to load events")?
            .into_iter()
            .filter(EventDoc::is_upcoming)
            .collect();

        info!("Pricing {} upcoming events", upcoming.len());

        let mut events = Vec::new();
        for event in &upcoming {
            match self.price_event(&event.id).await {
                Ok(mut priced) => events.append(&mut priced),
                Err(e) => error!("Failed to price event {}: {:#}", event.id, e),
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantasy_store::{EventStatus, InMemoryStore};

    fn fighter(id: &str, ranking: Option<u32>, wins: u32, losses: u32) -> FighterDoc {
        FighterDoc {
            id: id.to_string(),
            name: id.to_uppercase(),
            division: "Lightweight".to_string(),
            ranking,
            is_champion: false,
            wins,
            losses,
            draws: 0,
        }
    }

    fn fight(id: &str, event_id: &str, a: &str, b: &str, odds_a: i32, odds_b: i32) -> FightDoc {
        FightDoc {
            id: id.to_string(),
            event_id: event_id.to_string(),
            fighter_a: a.to_string(),
            fighter_b: b.to_string(),
            odds_a: Some(odds_a),
            odds_b: Some(odds_b),
            scheduled_rounds: 3,
            title_fight: false,
            main_card: true,
            start_time: None,
            result: None,
        }
    }

    async fn seeded_store() -> Arc<dyn DocumentStore> {
        let store = InMemoryStore::new();
        let mut batch = WriteBatch::new();
        batch
            .set(
                Collection::Events,
                "ev1",
                &EventDoc {
                    id: "ev1".to_string(),
                    name: "UFC 300".to_string(),
                    date: Utc::now(),
                    status: EventStatus::Upcoming,
                    fight_ids: vec!["f1".to_string(), "f2".to_string()],
                },
            )
            .unwrap();
        batch.set(Collection::Fighters, "red", &fighter("red", Some(3), 10, 2)).unwrap();
        batch.set(Collection::Fighters, "blue", &fighter("blue", None, 4, 4)).unwrap();
        batch.set(Collection::Fighters, "green", &fighter("green", None, 1, 0)).unwrap();
        batch.set(Collection::Fights, "f1", &fight("f1", "ev1", "red", "blue", -200, 170)).unwrap();
        batch.set(Collection::Fights, "f2", &fight("f2", "ev1", "green", "ghost", 120, -140)).unwrap();
        store.commit(batch).await.unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_price_event_writes_salaries_and_skips_missing_fighters() {
        let store = seeded_store().await;
        let engine = SalaryEngine::new(SalaryConfig::default(), store.clone());

        let events = engine.price_event("ev1").await.unwrap();

        let red: SalaryDoc = store.require_doc(Collection::Salaries, "ev1_red").await.unwrap();
        assert_eq!(red.salary, 2600);
        assert_eq!(red.factors.ranking, 90);

        let blue: SalaryDoc = store.require_doc(Collection::Salaries, "ev1_blue").await.unwrap();
        // 1000 + 0 + 100 (underdog) + 0 + 0
        assert_eq!(blue.salary, 1100);

        assert!(store.get(Collection::Salaries, "ev1_ghost").await.unwrap().is_none());
        assert!(events.iter().any(|e| matches!(
            e,
            SalaryEvent::FighterSkipped { fighter_id, .. } if fighter_id == "ghost"
        )));
        assert!(matches!(
            events.last(),
            Some(SalaryEvent::BatchCompleted { processed_count: 3, skipped_count: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_repricing_overwrites() {
        let store = seeded_store().await;
        let engine = SalaryEngine::new(SalaryConfig::default(), store.clone());
        engine.price_event("ev1").await.unwrap();
        let events = engine.price_event("ev1").await.unwrap();

        assert_eq!(store.list(Collection::Salaries).await.unwrap().len(), 3);
        assert!(events.iter().any(|e| matches!(
            e,
            SalaryEvent::SalaryUpdated { fighter_id, previous: Some(2600), .. } if fighter_id == "red"
        )));
    }

    #[tokio::test]
    async fn test_price_upcoming_skips_completed_events() {
        let store = seeded_store().await;
        let mut done: EventDoc = store.require_doc(Collection::Events, "ev1").await.unwrap();
        done.id = "ev0".to_string();
        done.status = EventStatus::Completed;
        done.fight_ids.clear();
        store.put_doc(Collection::Events, "ev0", &done).await.unwrap();

        let engine = SalaryEngine::new(SalaryConfig::default(), store);
        let events = engine.price_upcoming().await.unwrap();
        assert!(events.iter().all(|e| match e {
            SalaryEvent::SalaryUpdated { event_id, .. }
            | SalaryEvent::FighterSkipped { event_id, .. }
            | SalaryEvent::BatchCompleted { event_id, .. } => event_id == "ev1",
        }));
    }

    #[tokio::test]
    async fn test_unknown_event_is_an_error() {
        let engine = SalaryEngine::new(SalaryConfig::default(), Arc::new(InMemoryStore::new()));
        assert!(engine.price_event("nope").await.is_err());
    }
}
