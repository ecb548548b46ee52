//! Post-event scoring: lock entries, score picks, settle coin stakes and rank
//! each league

use anyhow::{bail, Context};
use chrono::{DateTime, Duration, Utc};
use fantasy_store::{
    entry_lock_at, Collection, DocumentStore, EventDoc, EventStatus, FightDoc, ScoreDoc, StoreExt, UserDoc,
    WriteBatch, SCORING_RULES_DOC,
};
use prediction_scorer::{
    score_entry, CoinLedger, EntryState, FightId, FightOutcome, FighterId, PredictionEntry, PredictionScoringRules,
    DEFAULT_LOCK_LEAD_MINUTES,
};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Optional rules file used when the store holds no rules document
pub const RULES_FILE_VAR: &str = "FANTASY_SCORING_RULES_FILE";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreReport {
    pub event_id: String,
    pub scored: usize,
    pub already_scored: usize,
    /// Entries that could not be decoded or break pick rules
    pub skipped: usize,
    /// Stakes the user could not cover
    pub voided_stakes: usize,
    pub coins_paid: u64,
    /// Every score of the event, ordered by league then rank
    pub scores: Vec<ScoreDoc>,
}

/// Stored rules from `fantasy_config/scoring_rules`, falling back to the
/// defaults with file and environment overrides
pub async fn load_scoring_rules(store: &dyn DocumentStore) -> anyhow::Result<PredictionScoringRules> {
    let stored = store
        .get_doc::<PredictionScoringRules>(Collection::FantasyConfig, SCORING_RULES_DOC)
        .await
        .context("Failed to load scoring rules")?;

    let rules = match stored {
        Some(rules) => rules,
        None => {
            let path = std::env::var(RULES_FILE_VAR).ok().map(PathBuf::from);
            info!("No stored scoring rules, using defaults (file: {:?})", path);
            PredictionScoringRules::load(path.as_deref())?
        }
    };
    rules.validate().with_context(|| format!("Scoring rules {} are invalid", rules.id))?;
    Ok(rules)
}

/// Rank scores within each league: points desc, fewer edits, then user id
pub fn assign_ranks(scores: &mut [ScoreDoc], edit_counts: &HashMap<String, u32>) {
    let edits = |s: &ScoreDoc| edit_counts.get(&s.entry_id).copied().unwrap_or(u32::MAX);
    scores.sort_by(|a, b| {
        a.league_id
            .cmp(&b.league_id)
            .then(b.total.total_cmp(&a.total))
            .then(edits(a).cmp(&edits(b)))
            .then(a.user_id.cmp(&b.user_id))
    });

    let mut league: Option<String> = None;
    let mut rank = 0;
    for score in scores.iter_mut() {
        if league.as_deref() != Some(score.league_id.as_str()) {
            league = Some(score.league_id.clone());
            rank = 0;
        }
        rank += 1;
        score.rank = Some(rank);
    }
}

async fn event_entries(
    store: &dyn DocumentStore,
    event_id: &str,
    report: &mut ScoreReport,
) -> anyhow::Result<Vec<PredictionEntry>> {
    let raw = store.list(Collection::FantasyEntries).await.context("Failed to load entries")?;

    let mut entries = Vec::new();
    for (id, value) in raw {
        match serde_json::from_value::<PredictionEntry>(value) {
            Ok(entry) if entry.event_id == event_id => match entry.validate() {
                Ok(()) => entries.push(entry),
                Err(e) => {
                    warn!("Skipping invalid entry {}: {}", id, e);
                    report.skipped += 1;
                }
            },
            Ok(_) => {}
            Err(e) => {
                warn!("Skipping unreadable entry {}: {}", id, e);
                report.skipped += 1;
            }
        }
    }
    Ok(entries)
}

/// Score every entry of a completed event in one batch
pub async fn score_event(store: &dyn DocumentStore, event_id: &str, now: DateTime<Utc>) -> anyhow::Result<ScoreReport> {
    let event: EventDoc = store
        .require_doc(Collection::Events, event_id)
        .await
        .with_context(|| format!("Failed to load event {event_id}"))?;
    if event.status != EventStatus::Completed {
        bail!("Event {} ({}) is not completed", event.name, event.id);
    }

    let rules = load_scoring_rules(store).await?;
    info!("Scoring event {} ({}) with rules {}", event.name, event.id, rules.id);

    let fights: Vec<FightDoc> = store
        .list_docs::<FightDoc>(Collection::Fights)
        .await
        .context("Failed to load fights")?
        .into_iter()
        .filter(|f| f.event_id == event.id)
        .collect();

    let mut outcomes: HashMap<FightId, FightOutcome> = HashMap::new();
    let mut odds: HashMap<FighterId, i32> = HashMap::new();
    for fight in &fights {
        for (fighter_id, fighter_odds) in [(&fight.fighter_a, fight.odds_a), (&fight.fighter_b, fight.odds_b)] {
            if let Some(o) = fighter_odds {
                odds.insert(fighter_id.clone(), o);
            }
        }
        match &fight.result {
            Some(outcome) => {
                outcomes.insert(fight.id.clone(), outcome.clone());
            }
            None => warn!("Fight {} has no result, its picks stay pending", fight.id),
        }
    }

    let mut report = ScoreReport { event_id: event.id.clone(), ..Default::default() };
    let entries = event_entries(store, &event.id, &mut report).await?;
    let edit_counts: HashMap<String, u32> = entries.iter().map(|e| (e.id.clone(), e.edit_count())).collect();

    let mut scores: Vec<ScoreDoc> = store
        .list_docs::<ScoreDoc>(Collection::FantasyScores)
        .await
        .context("Failed to load existing scores")?
        .into_iter()
        .filter(|s| s.event_id == event.id)
        .collect();

    let card_lock_at = entry_lock_at(&fights, Duration::minutes(DEFAULT_LOCK_LEAD_MINUTES));

    // Balances of users with stakes to settle
    let mut ledger = CoinLedger::new();
    let mut users: HashMap<String, UserDoc> = HashMap::new();
    for entry in entries.iter().filter(|e| e.state() != EntryState::Scored) {
        let staked = entry.picks().iter().any(|p| p.stake.is_some() && outcomes.contains_key(&p.fight_id));
        if !staked || users.contains_key(&entry.user_id) {
            continue;
        }
        match store.get_doc::<UserDoc>(Collection::Users, &entry.user_id).await {
            Ok(Some(user)) => {
                ledger.open_account(&entry.user_id, user.coins);
                users.insert(entry.user_id.clone(), user);
            }
            Ok(None) => warn!("User {} not found, their stakes are void", entry.user_id),
            Err(e) => error!("Failed to load user {}: {}", entry.user_id, e),
        }
    }

    let mut batch = WriteBatch::new();

    for mut entry in entries {
        if entry.state() == EntryState::Scored {
            report.already_scored += 1;
            continue;
        }

        if entry.lock_at.is_none() {
            entry.lock_at = card_lock_at;
        }
        entry.lock(now);
        let score = score_entry(&entry, &outcomes, &odds, &rules);
        entry.apply_score(&score)?;

        let settled_from = ledger.history().len();
        let mut payout = 0;
        for pick in entry.picks() {
            let Some(stake) = pick.stake else {
                continue;
            };
            let Some(outcome) = outcomes.get(&pick.fight_id) else {
                warn!("Stake on pending fight {} for entry {} left open", pick.fight_id, entry.id);
                continue;
            };
            if let Err(e) = ledger.place(&entry.user_id, &pick.fight_id, &stake) {
                warn!("Voiding stake of {} on fight {}: {}", entry.user_id, pick.fight_id, e);
                report.voided_stakes += 1;
                continue;
            }
            payout += ledger.settle(&entry.user_id, pick, outcome, &rules)?;
        }

        info!("Entry {} ({}): {:.2} pts, {} coins", entry.id, entry.user_id, score.total, payout);

        scores.retain(|s| s.entry_id != entry.id);
        scores.push(ScoreDoc {
            entry_id: entry.id.clone(),
            user_id: entry.user_id.clone(),
            league_id: entry.league_id.clone(),
            event_id: event.id.clone(),
            rules_id: score.rules_id,
            total: score.total,
            picks: score.picks,
            pending: score.pending,
            coin_payout: payout,
            coin_transactions: ledger.history()[settled_from..].to_vec(),
            rank: None,
            scored_at: now,
        });

        entry.updated_at = Some(now);
        batch.set(Collection::FantasyEntries, entry.id.clone(), &entry)?;
        report.scored += 1;
        report.coins_paid += payout;
    }

    if report.scored == 0 {
        info!("No entries to score for event {}", event.id);
        assign_ranks(&mut scores, &edit_counts);
        report.scores = scores;
        return Ok(report);
    }

    for (user_id, mut user) in users {
        let balance = ledger.balance(&user_id);
        if balance != user.coins {
            info!("Coins for {}: {} -> {}", user_id, user.coins, balance);
            user.coins = balance;
            batch.set(Collection::Users, user_id, &user)?;
        }
    }

    assign_ranks(&mut scores, &edit_counts);
    for score in &scores {
        batch.set(Collection::FantasyScores, score.entry_id.clone(), score)?;
    }

    let written = store.commit(batch).await.context("Failed to store scores")?;
    info!("Scored {} entries for event {} ({} writes)", report.scored, event.id, written);

    report.scores = scores;
    Ok(report)
}

/// Score every completed event. A failing event is logged and skipped.
pub async fn score_completed_events(store: &dyn DocumentStore, now: DateTime<Utc>) -> anyhow::Result<Vec<ScoreReport>> {
    let completed: Vec<EventDoc> = store
        .list_docs::<EventDoc>(Collection::Events)
        .await
        .context("Failed to load events")?
        .into_iter()
        .filter(|e| e.status == EventStatus::Completed)
        .collect();

    let mut reports = Vec::new();
    for event in &completed {
        match score_event(store, &event.id, now).await {
            Ok(report) => reports.push(report),
            Err(e) => error!("Failed to score event {}: {:#}", event.id, e),
        }
    }
    Ok(reports)
}
