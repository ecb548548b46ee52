use serde::{Deserialize, Serialize};

/// Fighter document id
pub type FighterId = String;

/// Fight document id
pub type FightId = String;

/// How a fight ended (or how a user predicts it will end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishMethod {
    KoTko,
    Submission,
    Decision,
    Dq,
    Draw,
    /// Only ever an actual outcome, never a pick
    NoContest,
}

impl FinishMethod {
    /// Whether this method means the fight was stopped inside the distance
    pub fn is_stoppage(&self) -> bool {
        matches!(self, FinishMethod::KoTko | FinishMethod::Submission)
    }

    /// Whether this method means the fight went to the scorecards
    pub fn went_distance(&self) -> bool {
        matches!(self, FinishMethod::Decision | FinishMethod::Draw)
    }
}

/// Round prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPick {
    Round(u8),
    GoesTheDistance,
}

/// Externally supplied rarity tier of a correct pick combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RarityTier {
    S,
    A,
    B,
    Decision,
}

/// Per-fighter performance numbers from the official stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub knockdowns: u32,
    pub significant_strikes: u32,
    pub takedowns: u32,
    pub control_seconds: u32,
    pub submission_attempts: u32,
    pub reversals: u32,
}

/// One corner of a completed fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerReport {
    pub fighter_id: FighterId,
    #[serde(default)]
    pub stats: PerformanceStats,
    #[serde(default)]
    pub missed_weight: bool,
    #[serde(default)]
    pub short_notice: bool,
}

impl CornerReport {
    pub fn new(fighter_id: impl Into<FighterId>) -> Self {
        Self {
            fighter_id: fighter_id.into(),
            stats: PerformanceStats::default(),
            missed_weight: false,
            short_notice: false,
        }
    }
}

/// Official result of a completed fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightOutcome {
    pub fight_id: FightId,
    /// None for draws and no contests
    pub winner: Option<FighterId>,
    pub method: FinishMethod,
    /// 1-based round the fight ended in
    pub round: u8,
    /// 3 for regular bouts, 5 for championship/main events
    pub scheduled_rounds: u8,
    #[serde(default)]
    pub title_fight: bool,
    pub corners: [CornerReport; 2],
    #[serde(default)]
    pub rarity: Option<RarityTier>,
}

impl FightOutcome {
    /// Report for the given fighter, if they fought in this bout
    pub fn corner(&self, fighter_id: &str) -> Option<&CornerReport> {
        self.corners.iter().find(|c| c.fighter_id == fighter_id)
    }

    pub fn is_winner(&self, fighter_id: &str) -> bool {
        self.winner.as_deref() == Some(fighter_id)
    }

    pub fn is_championship_length(&self) -> bool {
        self.scheduled_rounds >= 5
    }

    pub fn went_distance(&self) -> bool {
        self.method.went_distance()
    }
}

/// How specific a coin stake's declared combination is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetSpecificity {
    WinnerOnly,
    WinnerMethod,
    WinnerMethodRound,
}

/// Optional side-bet attached to a pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinStake {
    pub amount: u64,
    pub specificity: BetSpecificity,
}

/// A user's prediction for one fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub fight_id: FightId,
    pub fighter_id: FighterId,
    pub method: FinishMethod,
    pub round: RoundPick,
    #[serde(default)]
    pub captain: bool,
    #[serde(default)]
    pub stake: Option<CoinStake>,
}

impl Pick {
    pub fn new(
        fight_id: impl Into<FightId>,
        fighter_id: impl Into<FighterId>,
        method: FinishMethod,
        round: RoundPick,
    ) -> Self {
        Self {
            fight_id: fight_id.into(),
            fighter_id: fighter_id.into(),
            method,
            round,
            captain: false,
            stake: None,
        }
    }

    pub fn with_captain(mut self) -> Self {
        self.captain = true;
        self
    }

    pub fn with_stake(mut self, amount: u64, specificity: BetSpecificity) -> Self {
        self.stake = Some(CoinStake { amount, specificity });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_classification() {
        assert!(FinishMethod::KoTko.is_stoppage());
        assert!(FinishMethod::Submission.is_stoppage());
        assert!(!FinishMethod::Dq.is_stoppage());
        assert!(FinishMethod::Decision.went_distance());
        assert!(FinishMethod::Draw.went_distance());
        assert!(!FinishMethod::NoContest.went_distance());
    }

    #[test]
    fn test_pick_deserializes_with_defaults() {
        let pick: Pick = serde_json::from_str(
            r#"{"fight_id":"f1","fighter_id":"a","method":"ko_tko","round":{"round":2}}"#,
        )
        .unwrap();
        assert_eq!(pick.round, RoundPick::Round(2));
        assert!(!pick.captain);
        assert!(pick.stake.is_none());
    }
}
