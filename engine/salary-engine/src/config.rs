use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Configuration for the Salary Engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryConfig {
    /// Base, band and rounding
    pub salary: SalaryParameters,

    /// Ranking-tier bonuses
    pub ranking: RankingTiers,

    /// Favorite/underdog bonuses
    pub odds: OddsTiers,

    /// Win-rate bonuses
    pub recent_form: FormTiers,

    /// Popularity bonuses, keyed off title and ranking
    pub popularity: PopularityTiers,
}

/// Bonus added to the salary plus the 0-100 factor score it reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub bonus: i64,
    pub score: u32,
}

impl Tier {
    pub const fn new(bonus: i64, score: u32) -> Self {
        Self { bonus, score }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryParameters {
    /// Starting score before bonuses
    pub base: i64,

    /// Lowest salary ever assigned
    pub floor: i64,

    /// Highest salary ever assigned
    pub ceiling: i64,

    /// Salaries are rounded to a multiple of this
    pub step: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingTiers {
    pub champion: Tier,
    pub top5: Tier,
    pub top10: Tier,
    pub top15: Tier,
    pub unranked: Tier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsTiers {
    pub favorite: Tier,
    pub underdog: Tier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTiers {
    /// Win rate strictly above `hot_threshold`
    pub hot: Tier,
    /// Win rate strictly above `winning_threshold`
    pub winning: Tier,
    pub other: Tier,
    pub hot_threshold: f64,
    pub winning_threshold: f64,
    /// Win rate assumed for a fighter with no recorded fights
    pub default_win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularityTiers {
    pub champion: Tier,
    pub top3: Tier,
    pub top10: Tier,
    pub other: Tier,
}

impl Default for SalaryConfig {
    fn default() -> Self {
        Self {
            salary: SalaryParameters { base: 1000, floor: 1000, ceiling: 4000, step: 100 },
            ranking: RankingTiers {
                champion: Tier::new(800, 100),
                top5: Tier::new(600, 90),
                top10: Tier::new(400, 70),
                top15: Tier::new(200, 50),
                unranked: Tier::new(0, 30),
            },
            odds: OddsTiers { favorite: Tier::new(300, 70), underdog: Tier::new(100, 40) },
            recent_form: FormTiers {
                hot: Tier::new(400, 80),
                winning: Tier::new(200, 60),
                other: Tier::new(0, 40),
                hot_threshold: 0.7,
                winning_threshold: 0.5,
                default_win_rate: 0.5,
            },
            popularity: PopularityTiers {
                champion: Tier::new(500, 100),
                top3: Tier::new(300, 90),
                top10: Tier::new(150, 70),
                other: Tier::new(0, 50),
            },
        }
    }
}

fn parse_var(name: &str) -> anyhow::Result<Option<i64>> {
    match std::env::var(name) {
        Ok(value) => {
            let parsed = value.parse().with_context(|| format!("Invalid {name}: {value}"))?;
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}

impl SalaryConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(base) = parse_var("SALARY_BASE")? {
            config.salary.base = base;
        }

        if let Some(floor) = parse_var("SALARY_FLOOR")? {
            config.salary.floor = floor;
        }

        if let Some(ceiling) = parse_var("SALARY_CEILING")? {
            config.salary.ceiling = ceiling;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let s = &self.salary;
        if s.step <= 0 {
            anyhow::bail!("Salary step must be positive, got {}", s.step);
        }
        if s.floor > s.ceiling {
            anyhow::bail!("Salary floor {} is above ceiling {}", s.floor, s.ceiling);
        }
        if s.floor % s.step != 0 || s.ceiling % s.step != 0 {
            anyhow::bail!("Salary band {}-{} must be multiples of {}", s.floor, s.ceiling, s.step);
        }
        Ok(())
    }
}
