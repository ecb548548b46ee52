//! Prediction Scorer
//!
//! Scores a user's per-fight picks for an event against the official results,
//! drives the prediction entry lifecycle (open → locked → scored) and keeps the
//! optional coin side-bet ledger, which is independent of prediction points.

pub mod coins;
pub mod entry;
pub mod error;
pub mod models;
pub mod rules;
pub mod scorer;

pub use coins::{stake_won, CoinLedger, CoinTransaction, CoinTransactionKind};
pub use entry::{lock_time, EntryState, PredictionEntry, DEFAULT_LOCK_LEAD_MINUTES};
pub use error::ScoringError;
pub use models::*;
pub use rules::PredictionScoringRules;
pub use scorer::{score_entry, score_pick, EntryScore, PickScore};

// Result type alias
pub type Result<T> = std::result::Result<T, ScoringError>;
