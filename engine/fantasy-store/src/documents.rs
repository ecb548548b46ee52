//! Typed documents for the fantasy collections

use chrono::{DateTime, Duration, Utc};
use prediction_scorer::{lock_time, CoinTransaction, FightOutcome, PickScore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming,
    Completed,
}

/// A card of fights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDoc {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub status: EventStatus,
    /// Fight ids on the card, main event first
    #[serde(default)]
    pub fight_ids: Vec<String>,
}

impl EventDoc {
    pub fn is_upcoming(&self) -> bool {
        self.status == EventStatus::Upcoming
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterDoc {
    pub id: String,
    pub name: String,
    pub division: String,
    /// Division ranking, None when unranked
    #[serde(default)]
    pub ranking: Option<u32>,
    #[serde(default)]
    pub is_champion: bool,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub draws: u32,
}

/// A scheduled bout; `result` is attached after the event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightDoc {
    pub id: String,
    pub event_id: String,
    pub fighter_a: String,
    pub fighter_b: String,
    /// American moneyline odds per side
    #[serde(default)]
    pub odds_a: Option<i32>,
    #[serde(default)]
    pub odds_b: Option<i32>,
    #[serde(default = "default_scheduled_rounds")]
    pub scheduled_rounds: u8,
    #[serde(default)]
    pub title_fight: bool,
    #[serde(default)]
    pub main_card: bool,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result: Option<FightOutcome>,
}

fn default_scheduled_rounds() -> u8 {
    3
}

impl FightDoc {
    pub fn involves(&self, fighter_id: &str) -> bool {
        self.fighter_a == fighter_id || self.fighter_b == fighter_id
    }

    /// Opponent id plus (own odds, opponent odds) for one side of the bout
    pub fn matchup_for(&self, fighter_id: &str) -> Option<(&str, Option<i32>, Option<i32>)> {
        if self.fighter_a == fighter_id {
            Some((self.fighter_b.as_str(), self.odds_a, self.odds_b))
        } else if self.fighter_b == fighter_id {
            Some((self.fighter_a.as_str(), self.odds_b, self.odds_a))
        } else {
            None
        }
    }

    pub fn odds_for(&self, fighter_id: &str) -> Option<i32> {
        self.matchup_for(fighter_id).and_then(|(_, own, _)| own)
    }
}

/// Entry lock time for a card: earliest main-card start minus `lead`.
/// None when no main-card fight has a start time.
pub fn entry_lock_at(fights: &[FightDoc], lead: Duration) -> Option<DateTime<Utc>> {
    fights
        .iter()
        .filter(|f| f.main_card)
        .filter_map(|f| f.start_time)
        .min()
        .map(|start| lock_time(start, lead))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeagueKind {
    /// Salary-capped team league (`leagues`)
    Classic,
    /// Prediction league (`fantasy_leagues`)
    Prediction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueDoc {
    pub id: String,
    pub name: String,
    pub event_id: String,
    pub kind: LeagueKind,
    pub is_public: bool,
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub salary_cap: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Factor scores (0-100) behind a salary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    pub ranking: u32,
    pub odds: u32,
    pub recent_form: u32,
    pub popularity: u32,
}

/// A fighter's price for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryDoc {
    pub event_id: String,
    pub fighter_id: String,
    pub salary: u32,
    pub factors: SalaryBreakdown,
    pub calculated_at: DateTime<Utc>,
}

impl SalaryDoc {
    /// Stable id so recomputation overwrites
    pub fn doc_id(event_id: &str, fighter_id: &str) -> String {
        format!("{event_id}_{fighter_id}")
    }
}

/// A salary-capped classic team for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDoc {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    #[serde(default)]
    pub league_id: Option<String>,
    pub fighter_ids: Vec<String>,
    /// Sum of the fighters' salaries for the event
    pub salary_total: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One position in a division's ranking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingDoc {
    pub division: String,
    pub fighter_id: String,
    /// 0 for the champion
    pub rank: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RankingDoc {
    pub fn doc_id(division: &str, rank: u32) -> String {
        format!("{division}_{rank}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDoc {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub coins: u64,
}

/// Scored result of one prediction entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDoc {
    pub entry_id: String,
    pub user_id: String,
    pub league_id: String,
    pub event_id: String,
    pub rules_id: String,
    pub total: f64,
    pub picks: Vec<PickScore>,
    #[serde(default)]
    pub pending: Vec<String>,
    #[serde(default)]
    pub coin_payout: u64,
    #[serde(default)]
    pub coin_transactions: Vec<CoinTransaction>,
    /// Position within the league, 1-based
    #[serde(default)]
    pub rank: Option<u32>,
    pub scored_at: DateTime<Utc>,
}

/// Id of the scoring rules document in `fantasy_config`
pub const SCORING_RULES_DOC: &str = "scoring_rules";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matchup_is_side_relative() {
        let fight: FightDoc = serde_json::from_value(serde_json::json!({
            "id": "f1",
            "event_id": "ev1",
            "fighter_a": "red",
            "fighter_b": "blue",
            "odds_a": -180,
            "odds_b": 150
        }))
        .unwrap();

        assert_eq!(fight.scheduled_rounds, 3);
        assert_eq!(fight.matchup_for("red"), Some(("blue", Some(-180), Some(150))));
        assert_eq!(fight.matchup_for("blue"), Some(("red", Some(150), Some(-180))));
        assert_eq!(fight.matchup_for("green"), None);
        assert_eq!(fight.odds_for("blue"), Some(150));
    }

    #[test]
    fn test_salary_doc_id() {
        assert_eq!(SalaryDoc::doc_id("ufc-300", "pereira"), "ufc-300_pereira");
    }

    #[test]
    fn test_lock_at_uses_earliest_main_card_fight() {
        let start = Utc::now();
        let fight = |id: &str, main_card: bool, offset_minutes: Option<i64>| -> FightDoc {
            serde_json::from_value(serde_json::json!({
                "id": id,
                "event_id": "ev1",
                "fighter_a": "a",
                "fighter_b": "b",
                "main_card": main_card,
                "start_time": offset_minutes.map(|m| start + Duration::minutes(m)),
            }))
            .unwrap()
        };
        let card = vec![
            fight("prelim", false, Some(-120)),
            fight("co_main", true, Some(30)),
            fight("opener", true, Some(0)),
            fight("unscheduled", true, None),
        ];

        assert_eq!(entry_lock_at(&card, Duration::minutes(15)), Some(start - Duration::minutes(15)));
        assert_eq!(entry_lock_at(&card[..1], Duration::minutes(15)), None);
        assert_eq!(entry_lock_at(&[], Duration::minutes(15)), None);
    }

    #[test]
    fn test_team_and_ranking_docs_decode() {
        let team: TeamDoc = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "event_id": "ev1",
            "user_id": "u1",
            "fighter_ids": ["red", "blue"],
            "salary_total": 5200
        }))
        .unwrap();
        assert_eq!(team.fighter_ids.len(), 2);
        assert_eq!(team.league_id, None);

        let ranking: RankingDoc = serde_json::from_value(serde_json::json!({
            "division": "lightweight",
            "fighter_id": "red",
            "rank": 3
        }))
        .unwrap();
        assert_eq!(RankingDoc::doc_id(&ranking.division, ranking.rank), "lightweight_3");

        let missing_salary = serde_json::json!({"id": "t2", "event_id": "ev1", "user_id": "u1", "fighter_ids": []});
        assert!(serde_json::from_value::<TeamDoc>(missing_salary).is_err());
    }
}
