use crate::entry::PredictionEntry;
use crate::models::*;
use crate::rules::PredictionScoringRules;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Point breakdown for a single pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickScore {
    pub fight_id: FightId,
    pub correct: bool,
    pub winner: f64,
    pub method: f64,
    pub round: f64,
    /// After subcaps, the fight-length cap and losing-fighter scaling
    pub performance: f64,
    pub early_finish: f64,
    pub rarity_multiplier: f64,
    pub underdog_multiplier: f64,
    pub context: f64,
    pub captain_multiplier: f64,
    pub total: f64,
}

impl PickScore {
    fn empty(fight_id: &str) -> Self {
        Self {
            fight_id: fight_id.to_string(),
            correct: false,
            winner: 0.0,
            method: 0.0,
            round: 0.0,
            performance: 0.0,
            early_finish: 0.0,
            rarity_multiplier: 1.0,
            underdog_multiplier: 1.0,
            context: 0.0,
            captain_multiplier: 1.0,
            total: 0.0,
        }
    }

    fn finalize(mut self) -> Self {
        let subtotal = (self.winner + self.method + self.round + self.performance + self.early_finish)
            * self.rarity_multiplier
            * self.underdog_multiplier;
        self.total = round_points((subtotal + self.context) * self.captain_multiplier);
        self
    }
}

/// Scored totals for one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryScore {
    pub entry_id: String,
    pub rules_id: String,
    pub picks: Vec<PickScore>,
    /// Fights with a pick but no official result yet
    pub pending: Vec<FightId>,
    pub total: f64,
}

fn round_points(points: f64) -> f64 {
    (points * 100.0).round() / 100.0
}

/// Weighted performance bonus before the fight-length cap
pub fn performance_bonus(stats: &PerformanceStats, rules: &PredictionScoringRules) -> f64 {
    let perf = &rules.performance;
    let control_minutes = (stats.control_seconds / 60) as f64;

    perf.knockdown.apply(stats.knockdowns as f64)
        + perf.significant_strike.apply(stats.significant_strikes as f64)
        + perf.takedown.apply(stats.takedowns as f64)
        + perf.control_minute.apply(control_minutes)
        + perf.submission_attempt.apply(stats.submission_attempts as f64)
        + perf.reversal.apply(stats.reversals as f64)
}

fn round_points_for(pick: RoundPick, outcome: &FightOutcome, rules: &PredictionScoringRules) -> f64 {
    match pick {
        RoundPick::Round(n) if n == outcome.round => rules.base.round_exact,
        RoundPick::Round(n) if n.abs_diff(outcome.round) == 1 => rules.base.round_close,
        RoundPick::Round(_) => 0.0,
        RoundPick::GoesTheDistance if outcome.went_distance() => rules.base.goes_the_distance,
        RoundPick::GoesTheDistance => 0.0,
    }
}

fn early_finish_for(outcome: &FightOutcome, rules: &PredictionScoringRules) -> f64 {
    if !outcome.method.is_stoppage() {
        return 0.0;
    }
    match outcome.round {
        4 | 5 if !outcome.is_championship_length() => 0.0,
        round => rules.early_finish.for_round(round),
    }
}

/// Score one pick against the official outcome.
///
/// `odds` is the selected fighter's American odds, if known.
pub fn score_pick(
    pick: &Pick,
    outcome: &FightOutcome,
    odds: Option<i32>,
    rules: &PredictionScoringRules,
) -> PickScore {
    let mut score = PickScore::empty(&pick.fight_id);
    if pick.captain {
        score.captain_multiplier = rules.captain_multiplier;
    }

    let corner = outcome.corner(&pick.fighter_id);
    if corner.is_some_and(|c| c.missed_weight) {
        score.context += rules.context.missed_weight;
    }

    if outcome.method == FinishMethod::NoContest {
        score.context += rules.context.no_contest;
        return score.finalize();
    }

    let raw_performance = corner.map_or(0.0, |c| performance_bonus(&c.stats, rules));
    let capped_performance = raw_performance.min(rules.performance_cap(outcome.scheduled_rounds));

    if outcome.is_winner(&pick.fighter_id) {
        score.correct = true;
        score.winner = rules.base.winner;
        if pick.method == outcome.method {
            score.method = rules.base.method;
        }
        score.round = round_points_for(pick.round, outcome, rules);
        score.performance = capped_performance;
        score.early_finish = early_finish_for(outcome, rules);
        score.rarity_multiplier = rules.rarity.multiplier(outcome.rarity);
        score.underdog_multiplier = odds.map_or(1.0, |o| rules.underdog_multiplier(o));

        if outcome.title_fight {
            score.context += rules.context.title_fight_win;
        }
        if corner.is_some_and(|c| c.short_notice) {
            score.context += rules.context.short_notice_win;
        }
    } else {
        score.performance = capped_performance * rules.performance.losing_fighter_multiplier;

        if outcome.method == FinishMethod::Draw && pick.method == FinishMethod::Draw {
            score.method = rules.base.method;
            if pick.round == RoundPick::GoesTheDistance {
                score.round = rules.base.goes_the_distance;
            }
        }
        if outcome.method == FinishMethod::Dq && outcome.winner.is_some() && corner.is_some() {
            score.context += rules.context.dq_loss;
        }
    }

    let score = score.finalize();
    debug!(
        "Scored pick on fight {} ({}): {:.2} pts (correct: {})",
        pick.fight_id, pick.fighter_id, score.total, score.correct
    );
    score
}

/// Score every pick of an entry and sum the totals
pub fn score_entry(
    entry: &PredictionEntry,
    outcomes: &HashMap<FightId, FightOutcome>,
    odds: &HashMap<FighterId, i32>,
    rules: &PredictionScoringRules,
) -> EntryScore {
    let mut picks = Vec::new();
    let mut pending = Vec::new();

    for pick in entry.picks() {
        match outcomes.get(&pick.fight_id) {
            Some(outcome) => {
                picks.push(score_pick(pick, outcome, odds.get(&pick.fighter_id).copied(), rules))
            }
            None => pending.push(pick.fight_id.clone()),
        }
    }

    let total = round_points(picks.iter().map(|p| p.total).sum());

    EntryScore { entry_id: entry.id.clone(), rules_id: rules.id.clone(), picks, pending, total }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn outcome(winner: Option<&str>, method: FinishMethod, round: u8, scheduled: u8) -> FightOutcome {
        FightOutcome {
            fight_id: "f1".to_string(),
            winner: winner.map(str::to_string),
            method,
            round,
            scheduled_rounds: scheduled,
            title_fight: false,
            corners: [CornerReport::new("red"), CornerReport::new("blue")],
            rarity: None,
        }
    }

    #[test]
    fn test_full_correct_pick_with_capped_performance_and_multipliers() {
        let rules = PredictionScoringRules::default();
        let mut result = outcome(Some("red"), FinishMethod::KoTko, 2, 3);
        result.rarity = Some(RarityTier::A);
        // 4 (kd, capped) + 3 (strikes, capped) + 2 (takedowns) = 9 before the cap of 8
        result.corners[0].stats = PerformanceStats {
            knockdowns: 2,
            significant_strikes: 30,
            takedowns: 2,
            ..Default::default()
        };
        assert!(approx(performance_bonus(&result.corners[0].stats, &rules), 9.0));

        let pick = Pick::new("f1", "red", FinishMethod::KoTko, RoundPick::Round(2));
        let score = score_pick(&pick, &result, Some(260), &rules);

        assert!(score.correct);
        assert!(approx(score.performance, 8.0));
        assert!(approx(score.early_finish, 3.0));
        // (10 + 5 + 5 + 8 + 3) * 1.3 * 1.2
        assert!(approx(score.total, 48.36));

        let captain = score_pick(&pick.clone().with_captain(), &result, Some(260), &rules);
        assert!(approx(captain.total, 72.54));
    }

    #[test]
    fn test_wrong_winner_keeps_scaled_performance_only() {
        let rules = PredictionScoringRules::default();
        let mut result = outcome(Some("red"), FinishMethod::Submission, 1, 3);
        result.rarity = Some(RarityTier::S);
        result.corners[1].stats = PerformanceStats { takedowns: 2, ..Default::default() };

        let pick = Pick::new("f1", "blue", FinishMethod::Submission, RoundPick::Round(1));
        let score = score_pick(&pick, &result, Some(500), &rules);

        assert!(!score.correct);
        assert_eq!(score.winner, 0.0);
        assert_eq!(score.method, 0.0);
        assert_eq!(score.round, 0.0);
        assert_eq!(score.early_finish, 0.0);
        assert_eq!(score.rarity_multiplier, 1.0);
        assert_eq!(score.underdog_multiplier, 1.0);
        assert!(approx(score.total, 1.0));
    }

    #[test]
    fn test_close_round_and_goes_the_distance() {
        let rules = PredictionScoringRules::default();
        let result = outcome(Some("red"), FinishMethod::KoTko, 3, 3);
        let close = Pick::new("f1", "red", FinishMethod::Submission, RoundPick::Round(2));
        let score = score_pick(&close, &result, None, &rules);
        // winner 10 + close round 2 + early finish R3 2
        assert!(approx(score.total, 14.0));

        let decision = outcome(Some("red"), FinishMethod::Decision, 3, 3);
        let gtd = Pick::new("f1", "red", FinishMethod::Decision, RoundPick::GoesTheDistance);
        let score = score_pick(&gtd, &decision, None, &rules);
        assert!(approx(score.total, 18.0));
        assert_eq!(score.early_finish, 0.0);
    }

    #[test]
    fn test_championship_late_finish_bonus() {
        let rules = PredictionScoringRules::default();
        let mut result = outcome(Some("red"), FinishMethod::KoTko, 4, 5);
        result.title_fight = true;
        let pick = Pick::new("f1", "red", FinishMethod::KoTko, RoundPick::Round(4));
        let score = score_pick(&pick, &result, None, &rules);
        assert!(approx(score.early_finish, 5.0));
        // 10 + 5 + 5 + 5 early + 3 title
        assert!(approx(score.total, 28.0));
    }

    #[test]
    fn test_five_round_performance_cap() {
        let rules = PredictionScoringRules::default();
        let mut result = outcome(Some("red"), FinishMethod::Decision, 5, 5);
        result.corners[0].stats = PerformanceStats {
            knockdowns: 3,
            significant_strikes: 120,
            takedowns: 5,
            control_seconds: 600,
            submission_attempts: 4,
            reversals: 2,
        };
        let pick = Pick::new("f1", "red", FinishMethod::KoTko, RoundPick::Round(1));
        let score = score_pick(&pick, &result, None, &rules);
        assert!(approx(score.performance, 12.0));
    }

    #[test]
    fn test_no_contest_awards_participation_credit() {
        let rules = PredictionScoringRules::default();
        let mut result = outcome(None, FinishMethod::NoContest, 1, 3);
        result.corners[0].stats.knockdowns = 1;
        let pick = Pick::new("f1", "red", FinishMethod::KoTko, RoundPick::Round(1)).with_captain();
        let score = score_pick(&pick, &result, None, &rules);
        assert!(approx(score.total, 1.5));
    }

    #[test]
    fn test_dq_loss_and_missed_weight_penalties() {
        let rules = PredictionScoringRules::default();
        let mut result = outcome(Some("red"), FinishMethod::Dq, 2, 3);
        result.corners[1].missed_weight = true;
        let pick = Pick::new("f1", "blue", FinishMethod::Decision, RoundPick::GoesTheDistance);
        let score = score_pick(&pick, &result, None, &rules);
        assert!(approx(score.context, -8.0));
        assert!(approx(score.total, -8.0));
    }

    #[test]
    fn test_draw_pick_on_draw() {
        let rules = PredictionScoringRules::default();
        let result = outcome(None, FinishMethod::Draw, 3, 3);
        let pick = Pick::new("f1", "red", FinishMethod::Draw, RoundPick::GoesTheDistance);
        let score = score_pick(&pick, &result, None, &rules);
        assert!(!score.correct);
        assert!(approx(score.total, 8.0));
    }

    #[test]
    fn test_short_notice_win_bonus() {
        let rules = PredictionScoringRules::default();
        let mut result = outcome(Some("blue"), FinishMethod::Decision, 3, 3);
        result.corners[1].short_notice = true;
        let pick = Pick::new("f1", "blue", FinishMethod::Decision, RoundPick::Round(3));
        let score = score_pick(&pick, &result, Some(180), &rules);
        // (10 + 5 + 5) * 1.1 + 2
        assert!(approx(score.total, 24.0));
    }

    #[test]
    fn test_score_entry_sums_and_reports_pending() {
        let rules = PredictionScoringRules::default();
        let mut entry = PredictionEntry::new("e1", "u1", "l1", "ev1", None);
        let now = chrono::Utc::now();
        entry
            .submit_pick(Pick::new("f1", "red", FinishMethod::Decision, RoundPick::Round(3)), now)
            .unwrap();
        entry
            .submit_pick(
                Pick::new("f2", "x", FinishMethod::KoTko, RoundPick::Round(1)).with_captain(),
                now,
            )
            .unwrap();

        let mut outcomes = HashMap::new();
        outcomes.insert("f1".to_string(), outcome(Some("red"), FinishMethod::Decision, 3, 3));

        let score = score_entry(&entry, &outcomes, &HashMap::new(), &rules);
        assert_eq!(score.picks.len(), 1);
        assert_eq!(score.pending, vec!["f2".to_string()]);
        assert!(approx(score.total, 20.0));
        assert_eq!(score.rules_id, "default-v1");
    }
}
