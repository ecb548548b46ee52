use anyhow::Context;
use chrono::{DateTime, Utc};
use fantasy_store::{Collection, DocumentStore, EventDoc, LeagueDoc, LeagueKind, StoreExt, WriteBatch};
use salary_engine::{SalaryConfig, SalaryEngine, SalaryEvent};
use std::sync::Arc;
use tracing::{debug, info};

/// Salary cap for seeded classic leagues
pub const CLASSIC_SALARY_CAP: u32 = 10_000;

pub fn global_league_id(event_id: &str) -> String {
    format!("global_{event_id}")
}

pub fn classic_league_id(event_id: &str) -> String {
    format!("classic_{event_id}")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub existing: usize,
}

fn league_for(event: &EventDoc, kind: LeagueKind, now: DateTime<Utc>) -> LeagueDoc {
    let (id, name, salary_cap) = match kind {
        LeagueKind::Prediction => (global_league_id(&event.id), format!("{} Global", event.name), None),
        LeagueKind::Classic => {
            (classic_league_id(&event.id), format!("{} Classic", event.name), Some(CLASSIC_SALARY_CAP))
        }
    };
    LeagueDoc {
        id,
        name,
        event_id: event.id.clone(),
        kind,
        is_public: true,
        member_ids: Vec::new(),
        salary_cap,
        created_at: now,
    }
}

/// Make sure every upcoming event has a public prediction league and a
/// classic league. Existing leagues are left untouched.
pub async fn seed_leagues(store: &dyn DocumentStore, now: DateTime<Utc>) -> anyhow::Result<SeedReport> {
    let events: Vec<EventDoc> = store.list_docs(Collection::Events).await.context("Failed to load events")?;

    let mut report = SeedReport::default();
    let mut batch = WriteBatch::new();

    for event in events.iter().filter(|e| e.is_upcoming()) {
        for (collection, kind) in
            [(Collection::FantasyLeagues, LeagueKind::Prediction), (Collection::Leagues, LeagueKind::Classic)]
        {
            let league = league_for(event, kind, now);
            if store.get(collection, &league.id).await?.is_some() {
                debug!("League {} already exists", league.id);
                report.existing += 1;
                continue;
            }
            info!("Creating {} for {}", league.name, event.id);
            batch.set(collection, league.id.clone(), &league)?;
            report.created.push(league.id);
        }
    }

    if !batch.is_empty() {
        store.commit(batch).await.context("Failed to create leagues")?;
    }
    info!("Created {} leagues, {} already present", report.created.len(), report.existing);
    Ok(report)
}

/// Price every upcoming event card
pub async fn seed_salaries(store: Arc<dyn DocumentStore>, config: SalaryConfig) -> anyhow::Result<Vec<SalaryEvent>> {
    let engine = SalaryEngine::new(config, store);
    engine.price_upcoming().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use fantasy_store::{EventStatus, FightDoc, FighterDoc, InMemoryStore, SalaryDoc};

    async fn store_with_events() -> InMemoryStore {
        let store = InMemoryStore::new();
        let mut batch = WriteBatch::new();
        for (id, status) in [("ev1", EventStatus::Upcoming), ("ev0", EventStatus::Completed)] {
            batch
                .set(
                    Collection::Events,
                    id,
                    &EventDoc {
                        id: id.to_string(),
                        name: format!("UFC {id}"),
                        date: Utc::now() + Duration::days(3),
                        status,
                        fight_ids: vec!["f1".to_string()],
                    },
                )
                .unwrap();
        }
        store.commit(batch).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_seed_leagues_is_idempotent() {
        let store = store_with_events().await;
        let now = Utc::now();

        let first = seed_leagues(&store, now).await.unwrap();
        assert_eq!(first.created, vec!["global_ev1".to_string(), "classic_ev1".to_string()]);
        assert_eq!(first.existing, 0);

        let global: LeagueDoc = store.require_doc(Collection::FantasyLeagues, "global_ev1").await.unwrap();
        assert_eq!(global.kind, LeagueKind::Prediction);
        assert!(global.is_public);
        let classic: LeagueDoc = store.require_doc(Collection::Leagues, "classic_ev1").await.unwrap();
        assert_eq!(classic.salary_cap, Some(CLASSIC_SALARY_CAP));

        let second = seed_leagues(&store, now + Duration::hours(1)).await.unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.existing, 2);

        let global_again: LeagueDoc = store.require_doc(Collection::FantasyLeagues, "global_ev1").await.unwrap();
        assert_eq!(global_again.created_at, now);
        assert!(store.get(Collection::FantasyLeagues, "global_ev0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seed_salaries_prices_upcoming_card() {
        let store = store_with_events().await;
        let mut batch = WriteBatch::new();
        for id in ["red", "blue"] {
            batch
                .set(
                    Collection::Fighters,
                    id,
                    &FighterDoc {
                        id: id.to_string(),
                        name: id.to_string(),
                        division: "Welterweight".to_string(),
                        ranking: None,
                        is_champion: false,
                        wins: 3,
                        losses: 3,
                        draws: 0,
                    },
                )
                .unwrap();
        }
        batch
            .set(
                Collection::Fights,
                "f1",
                &FightDoc {
                    id: "f1".to_string(),
                    event_id: "ev1".to_string(),
                    fighter_a: "red".to_string(),
                    fighter_b: "blue".to_string(),
                    odds_a: Some(-150),
                    odds_b: Some(130),
                    scheduled_rounds: 3,
                    title_fight: false,
                    main_card: true,
                    start_time: None,
                    result: None,
                },
            )
            .unwrap();
        store.commit(batch).await.unwrap();

        let store: Arc<dyn DocumentStore> = Arc::new(store);
        seed_salaries(store.clone(), SalaryConfig::default()).await.unwrap();

        assert!(store.get(Collection::Salaries, &SalaryDoc::doc_id("ev1", "red")).await.unwrap().is_some());
        assert!(store.get(Collection::Salaries, &SalaryDoc::doc_id("ev0", "red")).await.unwrap().is_none());
    }
}
