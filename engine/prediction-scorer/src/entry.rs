//! Prediction entry lifecycle
//!
//! An entry holds one user's picks for one event's main card. It moves
//! `Open → Locked → Scored` and never back; once locked its picks and
//! `edit_count` are frozen.

use crate::models::{FightId, FinishMethod, Pick};
use crate::scorer::EntryScore;
use crate::{Result, ScoringError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Open,
    Locked,
    Scored,
}

/// Lead window before the first main-card fight, in minutes
pub const DEFAULT_LOCK_LEAD_MINUTES: i64 = 15;

/// Lock time for an event: first main-card fight start minus the lead window
pub fn lock_time(first_main_card_start: DateTime<Utc>, lead: Duration) -> DateTime<Utc> {
    first_main_card_start - lead
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub id: String,
    pub user_id: String,
    pub league_id: String,
    pub event_id: String,
    picks: Vec<Pick>,
    state: EntryState,
    edit_count: u32,
    pub lock_at: Option<DateTime<Utc>>,
    pub total_points: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PredictionEntry {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        league_id: impl Into<String>,
        event_id: impl Into<String>,
        lock_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            league_id: league_id.into(),
            event_id: event_id.into(),
            picks: Vec::new(),
            state: EntryState::Open,
            edit_count: 0,
            lock_at,
            total_points: None,
            updated_at: None,
        }
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    pub fn pick(&self, fight_id: &str) -> Option<&Pick> {
        self.picks.iter().find(|p| p.fight_id == fight_id)
    }

    pub fn captain(&self) -> Option<&Pick> {
        self.picks.iter().find(|p| p.captain)
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn edit_count(&self) -> u32 {
        self.edit_count
    }

    /// Whether picks can still change at `now`
    pub fn is_editable(&self, now: DateTime<Utc>) -> bool {
        self.state == EntryState::Open && self.lock_at.map_or(true, |lock_at| now < lock_at)
    }

    fn ensure_editable(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.is_editable(now) {
            return Ok(());
        }
        self.lock(now);
        Err(ScoringError::EntryLocked { entry_id: self.id.clone() })
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.edit_count += 1;
        self.updated_at = Some(now);
    }

    /// Add a pick, replacing any existing pick on the same fight
    pub fn submit_pick(&mut self, pick: Pick, now: DateTime<Utc>) -> Result<()> {
        self.ensure_editable(now)?;
        check_pick(&pick)?;

        if pick.captain {
            if let Some(existing) = self.captain() {
                if existing.fight_id != pick.fight_id {
                    return Err(ScoringError::DuplicateCaptain {
                        entry_id: self.id.clone(),
                        fight_id: existing.fight_id.clone(),
                    });
                }
            }
        }

        match self.picks.iter_mut().find(|p| p.fight_id == pick.fight_id) {
            Some(existing) => *existing = pick,
            None => self.picks.push(pick),
        }
        self.touch(now);
        Ok(())
    }

    pub fn remove_pick(&mut self, fight_id: &str, now: DateTime<Utc>) -> Result<Pick> {
        self.ensure_editable(now)?;

        let index = self
            .picks
            .iter()
            .position(|p| p.fight_id == fight_id)
            .ok_or_else(|| ScoringError::UnknownFight { fight_id: fight_id.to_string() })?;
        let removed = self.picks.remove(index);
        self.touch(now);
        Ok(removed)
    }

    /// Move the captain flag to the pick on `fight_id`
    pub fn set_captain(&mut self, fight_id: &str, now: DateTime<Utc>) -> Result<()> {
        self.ensure_editable(now)?;

        if self.pick(fight_id).is_none() {
            return Err(ScoringError::UnknownFight { fight_id: fight_id.to_string() });
        }
        for pick in &mut self.picks {
            pick.captain = pick.fight_id == fight_id;
        }
        self.touch(now);
        Ok(())
    }

    /// Freeze the entry. No-op unless it is still open.
    pub fn lock(&mut self, now: DateTime<Utc>) {
        if self.state == EntryState::Open {
            self.state = EntryState::Locked;
            self.updated_at = Some(now);
            info!("Locked entry {} with {} picks ({} edits)", self.id, self.picks.len(), self.edit_count);
        }
    }

    pub fn apply_score(&mut self, score: &EntryScore) -> Result<()> {
        match self.state {
            EntryState::Open => Err(ScoringError::NotLocked { entry_id: self.id.clone() }),
            EntryState::Scored => Err(ScoringError::AlreadyScored { entry_id: self.id.clone() }),
            EntryState::Locked => {
                self.total_points = Some(score.total);
                self.state = EntryState::Scored;
                Ok(())
            }
        }
    }

    /// Check a decoded entry: one pick per fight, at most one captain and
    /// no no-contest picks
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut captain: Option<&FightId> = None;
        for pick in &self.picks {
            check_pick(pick)?;
            if !seen.insert(&pick.fight_id) {
                return Err(ScoringError::DuplicatePick {
                    entry_id: self.id.clone(),
                    fight_id: pick.fight_id.clone(),
                });
            }
            if pick.captain {
                if let Some(existing) = captain {
                    return Err(ScoringError::DuplicateCaptain {
                        entry_id: self.id.clone(),
                        fight_id: existing.clone(),
                    });
                }
                captain = Some(&pick.fight_id);
            }
        }
        Ok(())
    }

    /// Fights this entry has picks for
    pub fn fight_ids(&self) -> impl Iterator<Item = &FightId> {
        self.picks.iter().map(|p| &p.fight_id)
    }
}

fn check_pick(pick: &Pick) -> Result<()> {
    if pick.method == FinishMethod::NoContest {
        return Err(ScoringError::InvalidPick {
            fight_id: pick.fight_id.clone(),
            reason: "no contest cannot be picked".to_string(),
        });
    }
    Ok(())
}
