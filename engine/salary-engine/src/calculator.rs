use crate::config::{SalaryConfig, Tier};
use crate::models::*;
use tracing::debug;

/// Salary calculator. Pure: identical inputs always give identical salaries.
#[derive(Debug, Clone)]
pub struct SalaryCalculator {
    config: SalaryConfig,
}

impl SalaryCalculator {
    /// Create a new salary calculator
    pub fn new(config: SalaryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SalaryConfig {
        &self.config
    }

    fn ranking_tier(&self, profile: &FighterProfile) -> Tier {
        let tiers = &self.config.ranking;
        if profile.is_champion {
            return tiers.champion;
        }
        match profile.ranking {
            Some(1..=5) => tiers.top5,
            Some(6..=10) => tiers.top10,
            Some(11..=15) => tiers.top15,
            _ => tiers.unranked,
        }
    }

    /// Missing odds count as 0; equal odds resolve to favorite
    fn odds_tier(&self, fighter_odds: Option<i32>, opponent_odds: Option<i32>) -> (Tier, bool) {
        let underdog = fighter_odds.unwrap_or(0) > opponent_odds.unwrap_or(0);
        let tier = if underdog { self.config.odds.underdog } else { self.config.odds.favorite };
        (tier, underdog)
    }

    fn form_tier(&self, profile: &FighterProfile) -> Tier {
        let form = &self.config.recent_form;
        let win_rate = profile.win_rate().unwrap_or(form.default_win_rate);
        if win_rate > form.hot_threshold {
            form.hot
        } else if win_rate > form.winning_threshold {
            form.winning
        } else {
            form.other
        }
    }

    fn popularity_tier(&self, profile: &FighterProfile) -> Tier {
        let tiers = &self.config.popularity;
        if profile.is_champion {
            return tiers.champion;
        }
        match profile.ranking {
            Some(1..=3) => tiers.top3,
            Some(4..=10) => tiers.top10,
            _ => tiers.other,
        }
    }

    /// Round half-up to the configured step, then clamp to the band
    pub fn finalize(&self, raw_total: i64) -> u32 {
        let s = &self.config.salary;
        let rounded = ((raw_total as f64 / s.step as f64).round() as i64) * s.step;
        rounded.clamp(s.floor, s.ceiling).max(0) as u32
    }

    /// Calculate a fighter's salary for a bout against an opponent
    pub fn calculate(
        &self,
        profile: &FighterProfile,
        fighter_odds: Option<i32>,
        opponent_odds: Option<i32>,
    ) -> SalaryQuote {
        let ranking = self.ranking_tier(profile);
        let (odds, underdog) = self.odds_tier(fighter_odds, opponent_odds);
        let form = self.form_tier(profile);
        let popularity = self.popularity_tier(profile);

        let raw_total =
            self.config.salary.base + ranking.bonus + odds.bonus + form.bonus + popularity.bonus;
        let salary = self.finalize(raw_total);

        debug!(
            "Calculated salary for fighter {}: {} (raw: {}, underdog: {})",
            profile.fighter_id, salary, raw_total, underdog
        );

        SalaryQuote {
            fighter_id: profile.fighter_id.clone(),
            salary,
            raw_total,
            underdog,
            factors: SalaryFactors {
                ranking_score: ranking.score,
                odds_score: odds.score,
                recent_form_score: form.score,
                popularity_score: popularity.score,
            },
        }
    }
}
