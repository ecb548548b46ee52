use chrono::{DateTime, Utc};
use fantasy_store::{FighterDoc, SalaryBreakdown};
use serde::{Deserialize, Serialize};

/// Scoring inputs for one fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterProfile {
    pub fighter_id: String,
    pub ranking: Option<u32>,
    pub is_champion: bool,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl FighterProfile {
    pub fn total_fights(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// wins / (wins + losses + draws), or None with no recorded fights
    pub fn win_rate(&self) -> Option<f64> {
        match self.total_fights() {
            0 => None,
            total => Some(self.wins as f64 / total as f64),
        }
    }
}

impl From<&FighterDoc> for FighterProfile {
    fn from(doc: &FighterDoc) -> Self {
        Self {
            fighter_id: doc.id.clone(),
            ranking: doc.ranking,
            is_champion: doc.is_champion,
            wins: doc.wins,
            losses: doc.losses,
            draws: doc.draws,
        }
    }
}

/// 0-100 label for each salary factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryFactors {
    pub ranking_score: u32,
    pub odds_score: u32,
    pub recent_form_score: u32,
    pub popularity_score: u32,
}

impl From<SalaryFactors> for SalaryBreakdown {
    fn from(factors: SalaryFactors) -> Self {
        Self {
            ranking: factors.ranking_score,
            odds: factors.odds_score,
            recent_form: factors.recent_form_score,
            popularity: factors.popularity_score,
        }
    }
}

/// Calculated salary for one fighter in one bout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryQuote {
    pub fighter_id: String,
    /// Rounded and clamped
    pub salary: u32,
    /// Base plus bonuses before rounding and clamping
    pub raw_total: i64,
    pub underdog: bool,
    pub factors: SalaryFactors,
}

/// Events emitted while pricing an event card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SalaryEvent {
    /// Salary written for a fighter
    SalaryUpdated {
        event_id: String,
        fighter_id: String,
        salary: u32,
        previous: Option<u32>,
        timestamp: DateTime<Utc>,
    },

    /// Fighter left unpriced
    FighterSkipped {
        event_id: String,
        fighter_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Card processing completed
    BatchCompleted {
        event_id: String,
        processed_count: usize,
        skipped_count: usize,
        timestamp: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_rate() {
        let mut profile = FighterProfile {
            fighter_id: "f1".to_string(),
            ranking: None,
            is_champion: false,
            wins: 0,
            losses: 0,
            draws: 0,
        };
        assert_eq!(profile.win_rate(), None);

        profile.wins = 3;
        profile.losses = 1;
        assert_eq!(profile.win_rate(), Some(0.75));
    }
}
