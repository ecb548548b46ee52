//! Salary Engine
//!
//! Prices every fighter on an event card. A salary is derived from ranking,
//! the betting line against the opponent, recent win rate and a popularity
//! heuristic, rounded to the nearest step and clamped to a fixed band.

pub mod calculator;
pub mod config;
pub mod engine;
pub mod models;

pub use calculator::SalaryCalculator;
pub use config::SalaryConfig;
pub use engine::SalaryEngine;
pub use models::*;
