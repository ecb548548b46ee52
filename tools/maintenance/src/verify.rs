use crate::scoring::load_scoring_rules;
use fantasy_store::{Collection, DocumentStore, RankingDoc, StoreExt, TeamDoc};
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Collections that must hold at least one document
pub const REQUIRED_COLLECTIONS: [Collection; 3] = [Collection::Events, Collection::Fighters, Collection::Fights];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupReport {
    pub counts: BTreeMap<Collection, usize>,
    pub failures: Vec<String>,
    pub rules_id: Option<String>,
}

impl SetupReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count(&self, collection: Collection) -> usize {
        self.counts.get(&collection).copied().unwrap_or(0)
    }
}

/// Count documents per collection and check the scoring rules. Failures are
/// collected, not returned early, so one run reports everything.
pub async fn verify_setup(store: &dyn DocumentStore) -> SetupReport {
    let mut report = SetupReport::default();

    for collection in Collection::ALL {
        match store.list(collection).await {
            Ok(docs) => {
                info!("{}: {} documents", collection, docs.len());
                report.counts.insert(collection, docs.len());
            }
            Err(e) => {
                error!("Failed to read {}: {}", collection, e);
                report.failures.push(format!("{collection}: {e}"));
            }
        }
    }

    for collection in REQUIRED_COLLECTIONS {
        if report.counts.get(&collection) == Some(&0) {
            warn!("Required collection {} is empty", collection);
            report.failures.push(format!("{collection} is empty"));
        }
    }

    // Teams and rankings are written outside these scripts; check their shape
    if let Err(e) = store.list_docs::<TeamDoc>(Collection::Teams).await {
        error!("Team documents are invalid: {}", e);
        report.failures.push(format!("{}: {e}", Collection::Teams));
    }
    if let Err(e) = store.list_docs::<RankingDoc>(Collection::Rankings).await {
        error!("Ranking documents are invalid: {}", e);
        report.failures.push(format!("{}: {e}", Collection::Rankings));
    }

    match load_scoring_rules(store).await {
        Ok(rules) => {
            info!("Scoring rules {} are valid", rules.id);
            report.rules_id = Some(rules.id);
        }
        Err(e) => {
            error!("Scoring rules check failed: {:#}", e);
            report.failures.push(format!("scoring rules: {e:#}"));
        }
    }

    report
}
