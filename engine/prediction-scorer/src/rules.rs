//! Prediction scoring rules table
//!
//! Every weight, cap and multiplier the scorer uses lives here. A rules table is
//! versioned by `id` so stored scores can be traced back to the table that
//! produced them.

use crate::models::RarityTier;
use crate::{Result, ScoringError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete scoring rules table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionScoringRules {
    /// Version identifier of this table
    pub id: String,

    /// Base points for winner/method/round correctness
    pub base: BasePoints,

    /// Performance bonus weights and caps
    pub performance: PerformanceRules,

    /// Early-finish bonus table
    pub early_finish: EarlyFinishBonus,

    /// Rarity tier multipliers
    pub rarity: RarityMultipliers,

    /// Underdog bands, ascending by magnitude, last band open-ended
    pub underdog_bands: Vec<UnderdogBand>,

    /// Flat per-pick bonuses and penalties
    pub context: ContextAdjustments,

    /// Multiplier for the entry's captain pick
    pub captain_multiplier: f64,

    /// Coin side-bet payouts
    pub coins: CoinPayouts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasePoints {
    pub winner: f64,
    pub method: f64,
    pub round_exact: f64,
    /// Awarded when the predicted round is off by exactly one
    pub round_close: f64,
    /// Awarded for a goes-the-distance pick on a fight that went the distance
    pub goes_the_distance: f64,
}

/// Weight and subcap for one performance stat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatWeight {
    pub weight: f64,
    pub cap: f64,
}

impl StatWeight {
    pub fn apply(&self, value: f64) -> f64 {
        (value * self.weight).min(self.cap)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRules {
    pub knockdown: StatWeight,
    /// Weight is per significant strike
    pub significant_strike: StatWeight,
    pub takedown: StatWeight,
    /// Weight is per full minute of control
    pub control_minute: StatWeight,
    pub submission_attempt: StatWeight,
    pub reversal: StatWeight,
    /// Total cap for 3-round bouts
    pub cap_three_round: f64,
    /// Total cap for 5-round bouts
    pub cap_five_round: f64,
    /// Scale applied when the selected fighter lost
    pub losing_fighter_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyFinishBonus {
    pub round_one: f64,
    pub round_two: f64,
    pub round_three: f64,
    /// Finishes in rounds 4-5 of championship-length bouts
    pub championship_rounds: f64,
}

impl EarlyFinishBonus {
    pub fn for_round(&self, round: u8) -> f64 {
        match round {
            1 => self.round_one,
            2 => self.round_two,
            3 => self.round_three,
            4 | 5 => self.championship_rounds,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityMultipliers {
    pub s: f64,
    pub a: f64,
    pub b: f64,
    pub decision: f64,
}

impl RarityMultipliers {
    pub fn multiplier(&self, tier: Option<RarityTier>) -> f64 {
        match tier {
            Some(RarityTier::S) => self.s,
            Some(RarityTier::A) => self.a,
            Some(RarityTier::B) => self.b,
            Some(RarityTier::Decision) => self.decision,
            None => 1.0,
        }
    }
}

/// Odds band `+min_plus` to `+max_plus` (inclusive); `max_plus: None` is open-ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderdogBand {
    pub min_plus: i32,
    pub max_plus: Option<i32>,
    pub multiplier: f64,
}

impl UnderdogBand {
    pub fn contains(&self, odds: i32) -> bool {
        odds >= self.min_plus && self.max_plus.map_or(true, |max| odds <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextAdjustments {
    pub title_fight_win: f64,
    pub short_notice_win: f64,
    /// Negative
    pub missed_weight: f64,
    /// Negative
    pub dq_loss: f64,
    pub no_contest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinPayouts {
    pub winner_only: f64,
    pub winner_method: f64,
    pub winner_method_round: f64,
}

impl Default for PredictionScoringRules {
    fn default() -> Self {
        Self {
            id: "default-v1".to_string(),
            base: BasePoints {
                winner: 10.0,
                method: 5.0,
                round_exact: 5.0,
                round_close: 2.0,
                goes_the_distance: 3.0,
            },
            performance: PerformanceRules {
                knockdown: StatWeight { weight: 2.0, cap: 4.0 },
                significant_strike: StatWeight { weight: 0.1, cap: 3.0 },
                takedown: StatWeight { weight: 1.0, cap: 3.0 },
                control_minute: StatWeight { weight: 0.5, cap: 2.0 },
                submission_attempt: StatWeight { weight: 1.0, cap: 2.0 },
                reversal: StatWeight { weight: 1.0, cap: 1.0 },
                cap_three_round: 8.0,
                cap_five_round: 12.0,
                losing_fighter_multiplier: 0.5,
            },
            early_finish: EarlyFinishBonus {
                round_one: 4.0,
                round_two: 3.0,
                round_three: 2.0,
                championship_rounds: 5.0,
            },
            rarity: RarityMultipliers { s: 1.5, a: 1.3, b: 1.15, decision: 1.0 },
            underdog_bands: vec![
                UnderdogBand { min_plus: 150, max_plus: Some(249), multiplier: 1.1 },
                UnderdogBand { min_plus: 250, max_plus: Some(399), multiplier: 1.2 },
                UnderdogBand { min_plus: 400, max_plus: None, multiplier: 1.35 },
            ],
            context: ContextAdjustments {
                title_fight_win: 3.0,
                short_notice_win: 2.0,
                missed_weight: -3.0,
                dq_loss: -5.0,
                no_contest: 1.0,
            },
            captain_multiplier: 1.5,
            coins: CoinPayouts { winner_only: 2.0, winner_method: 3.0, winner_method_round: 5.0 },
        }
    }
}

impl PredictionScoringRules {
    /// Load rules: defaults, then an optional TOML/JSON file, then
    /// `FANTASY_SCORING__*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| ScoringError::invalid_rules(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            tracing::debug!("Loading scoring rules from file: {:?}", path);
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder
            .add_source(config::Environment::with_prefix("FANTASY_SCORING").separator("__"));

        let rules: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ScoringError::invalid_rules(e.to_string()))?;

        rules.validate()?;
        Ok(rules)
    }

    /// Check multipliers and the underdog band layout
    pub fn validate(&self) -> Result<()> {
        let multipliers = [
            ("captain_multiplier", self.captain_multiplier),
            ("losing_fighter_multiplier", self.performance.losing_fighter_multiplier),
            ("rarity.s", self.rarity.s),
            ("rarity.a", self.rarity.a),
            ("rarity.b", self.rarity.b),
            ("rarity.decision", self.rarity.decision),
            ("coins.winner_only", self.coins.winner_only),
            ("coins.winner_method", self.coins.winner_method),
            ("coins.winner_method_round", self.coins.winner_method_round),
        ];
        for (name, value) in multipliers {
            if !(value > 0.0) {
                return Err(ScoringError::invalid_rules(format!("{name} must be positive, got {value}")));
            }
        }

        if self.performance.cap_three_round < 0.0 || self.performance.cap_five_round < 0.0 {
            return Err(ScoringError::invalid_rules("performance caps must be non-negative"));
        }

        self.validate_underdog_bands()
    }

    fn validate_underdog_bands(&self) -> Result<()> {
        let bands = &self.underdog_bands;
        let Some(last) = bands.last() else {
            return Ok(());
        };
        if last.max_plus.is_some() {
            return Err(ScoringError::invalid_rules("last underdog band must be open-ended"));
        }

        for (i, band) in bands.iter().enumerate() {
            if band.min_plus <= 0 {
                return Err(ScoringError::invalid_rules(format!(
                    "underdog band {i} must start at positive odds"
                )));
            }
            if !(band.multiplier > 0.0) {
                return Err(ScoringError::invalid_rules(format!(
                    "underdog band {i} multiplier must be positive"
                )));
            }
            if let Some(next) = bands.get(i + 1) {
                let Some(max) = band.max_plus else {
                    return Err(ScoringError::invalid_rules(format!(
                        "only the last underdog band may be open-ended (band {i})"
                    )));
                };
                if max < band.min_plus {
                    return Err(ScoringError::invalid_rules(format!("underdog band {i} is empty")));
                }
                if next.min_plus != max + 1 {
                    return Err(ScoringError::invalid_rules(format!(
                        "underdog bands {i} and {} must be contiguous (+{max} then +{})",
                        i + 1,
                        next.min_plus
                    )));
                }
            }
        }
        Ok(())
    }

    /// Multiplier for a correct pick at the given American odds
    pub fn underdog_multiplier(&self, odds: i32) -> f64 {
        self.underdog_band(odds).map_or(1.0, |band| band.multiplier)
    }

    pub fn underdog_band(&self, odds: i32) -> Option<&UnderdogBand> {
        if odds <= 0 {
            return None;
        }
        self.underdog_bands.iter().find(|band| band.contains(odds))
    }

    /// Total performance cap for a bout of the given length
    pub fn performance_cap(&self, scheduled_rounds: u8) -> f64 {
        if scheduled_rounds >= 5 {
            self.performance.cap_five_round
        } else {
            self.performance.cap_three_round
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_rules_are_valid() {
        PredictionScoringRules::default().validate().unwrap();
    }

    #[test]
    fn test_every_positive_odds_maps_to_one_band() {
        let rules = PredictionScoringRules::default();
        for odds in -1000..=5000 {
            let matches = rules.underdog_bands.iter().filter(|b| b.contains(odds)).count();
            if odds >= 150 {
                assert_eq!(matches, 1, "odds {odds}");
            } else {
                assert_eq!(matches, 0, "odds {odds}");
                assert_eq!(rules.underdog_multiplier(odds), 1.0);
            }
        }
        assert_eq!(rules.underdog_multiplier(150), 1.1);
        assert_eq!(rules.underdog_multiplier(249), 1.1);
        assert_eq!(rules.underdog_multiplier(250), 1.2);
        assert_eq!(rules.underdog_multiplier(10_000), 1.35);
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let mut rules = PredictionScoringRules::default();
        rules.underdog_bands[1].min_plus = 200;
        assert!(matches!(rules.validate(), Err(ScoringError::InvalidRules(_))));
    }

    #[test]
    fn test_gapped_bands_rejected() {
        let mut rules = PredictionScoringRules::default();
        rules.underdog_bands[1].min_plus = 300;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_closed_last_band_rejected() {
        let mut rules = PredictionScoringRules::default();
        rules.underdog_bands[2].max_plus = Some(999);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_non_positive_captain_multiplier_rejected() {
        let mut rules = PredictionScoringRules::default();
        rules.captain_multiplier = 0.0;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_performance_cap_by_length() {
        let rules = PredictionScoringRules::default();
        assert_eq!(rules.performance_cap(3), 8.0);
        assert_eq!(rules.performance_cap(5), 12.0);
    }

    #[test]
    fn test_load_overrides_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rules.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "id = \"league-v2\"\ncaptain_multiplier = 1.25").unwrap();

        let rules = PredictionScoringRules::load(Some(&path)).unwrap();
        assert_eq!(rules.id, "league-v2");
        assert_eq!(rules.captain_multiplier, 1.25);
        assert_eq!(rules.base, PredictionScoringRules::default().base);
    }
}
