//! Error types for the prediction scorer

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Entry {entry_id} is locked")]
    EntryLocked { entry_id: String },

    #[error("Entry {entry_id} already has a captain on fight {fight_id}")]
    DuplicateCaptain { entry_id: String, fight_id: String },

    #[error("Entry {entry_id} has more than one pick on fight {fight_id}")]
    DuplicatePick { entry_id: String, fight_id: String },

    #[error("Invalid pick on fight {fight_id}: {reason}")]
    InvalidPick { fight_id: String, reason: String },

    #[error("Entry {entry_id} must be locked before it can be scored")]
    NotLocked { entry_id: String },

    #[error("Entry {entry_id} has already been scored")]
    AlreadyScored { entry_id: String },

    #[error("No pick for fight {fight_id}")]
    UnknownFight { fight_id: String },

    #[error("Insufficient coins: required {required}, available {available}")]
    InsufficientCoins { required: u64, available: u64 },

    #[error("No open stake for {user_id} on fight {fight_id}")]
    StakeNotPlaced { user_id: String, fight_id: String },

    #[error("Invalid scoring rules: {0}")]
    InvalidRules(String),
}

impl ScoringError {
    pub fn invalid_rules(msg: impl Into<String>) -> Self {
        Self::InvalidRules(msg.into())
    }
}
