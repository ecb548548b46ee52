//! Coin side-bet ledger
//!
//! Coins are a separate ledger from prediction points. A stake is debited when
//! placed and pays `stake × multiplier` if the declared combination was right.

use crate::models::{BetSpecificity, CoinStake, FightOutcome, Pick, RoundPick};
use crate::rules::PredictionScoringRules;
use crate::{Result, ScoringError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinTransactionKind {
    Grant,
    Stake,
    Payout,
    Forfeit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinTransaction {
    pub user_id: String,
    pub fight_id: Option<String>,
    pub kind: CoinTransactionKind,
    pub amount: u64,
}

/// Whether the declared combination of a stake came true
pub fn stake_won(pick: &Pick, stake: &CoinStake, outcome: &FightOutcome) -> bool {
    if !outcome.is_winner(&pick.fighter_id) {
        return false;
    }
    let method_ok = pick.method == outcome.method;
    let round_ok = match pick.round {
        RoundPick::Round(n) => n == outcome.round,
        RoundPick::GoesTheDistance => outcome.went_distance(),
    };
    match stake.specificity {
        BetSpecificity::WinnerOnly => true,
        BetSpecificity::WinnerMethod => method_ok,
        BetSpecificity::WinnerMethodRound => method_ok && round_ok,
    }
}

fn payout_multiplier(specificity: BetSpecificity, rules: &PredictionScoringRules) -> f64 {
    match specificity {
        BetSpecificity::WinnerOnly => rules.coins.winner_only,
        BetSpecificity::WinnerMethod => rules.coins.winner_method,
        BetSpecificity::WinnerMethodRound => rules.coins.winner_method_round,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinLedger {
    balances: HashMap<String, u64>,
    /// user id -> fight id -> stake debited but not yet settled
    open_stakes: HashMap<String, HashMap<String, CoinStake>>,
    history: Vec<CoinTransaction>,
}

impl CoinLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, user_id: &str) -> u64 {
        self.balances.get(user_id).copied().unwrap_or(0)
    }

    pub fn history(&self) -> &[CoinTransaction] {
        &self.history
    }

    fn record(&mut self, user_id: &str, fight_id: Option<&str>, kind: CoinTransactionKind, amount: u64) {
        self.history.push(CoinTransaction {
            user_id: user_id.to_string(),
            fight_id: fight_id.map(str::to_string),
            kind,
            amount,
        });
    }

    /// Load a stored balance without recording a transaction
    pub fn open_account(&mut self, user_id: &str, balance: u64) {
        self.balances.insert(user_id.to_string(), balance);
    }

    /// Stake debited for a fight and not yet settled
    pub fn open_stake(&self, user_id: &str, fight_id: &str) -> Option<&CoinStake> {
        self.open_stakes.get(user_id).and_then(|stakes| stakes.get(fight_id))
    }

    pub fn grant(&mut self, user_id: &str, amount: u64) {
        *self.balances.entry(user_id.to_string()).or_insert(0) += amount;
        self.record(user_id, None, CoinTransactionKind::Grant, amount);
    }

    /// Debit a stake for the pick's fight. At most one open stake per fight.
    pub fn place(&mut self, user_id: &str, fight_id: &str, stake: &CoinStake) -> Result<()> {
        if self.open_stake(user_id, fight_id).is_some() {
            return Err(ScoringError::InvalidPick {
                fight_id: fight_id.to_string(),
                reason: format!("{user_id} already has an open stake"),
            });
        }
        let available = self.balance(user_id);
        if stake.amount > available {
            return Err(ScoringError::InsufficientCoins { required: stake.amount, available });
        }
        self.balances.insert(user_id.to_string(), available - stake.amount);
        self.open_stakes.entry(user_id.to_string()).or_default().insert(fight_id.to_string(), *stake);
        self.record(user_id, Some(fight_id), CoinTransactionKind::Stake, stake.amount);
        Ok(())
    }

    /// Settle the stake placed on the pick's fight; returns the amount paid
    /// out (0 when forfeited). Fails if no stake was placed.
    pub fn settle(
        &mut self,
        user_id: &str,
        pick: &Pick,
        outcome: &FightOutcome,
        rules: &PredictionScoringRules,
    ) -> Result<u64> {
        let stake = self
            .open_stakes
            .get_mut(user_id)
            .and_then(|stakes| stakes.remove(&pick.fight_id))
            .ok_or_else(|| ScoringError::StakeNotPlaced {
                user_id: user_id.to_string(),
                fight_id: pick.fight_id.clone(),
            })?;

        if stake_won(pick, &stake, outcome) {
            let payout = (stake.amount as f64 * payout_multiplier(stake.specificity, rules)).floor() as u64;
            *self.balances.entry(user_id.to_string()).or_insert(0) += payout;
            self.record(user_id, Some(&pick.fight_id), CoinTransactionKind::Payout, payout);
            tracing::info!("Paid {} coins to {} on fight {}", payout, user_id, pick.fight_id);
            Ok(payout)
        } else {
            self.record(user_id, Some(&pick.fight_id), CoinTransactionKind::Forfeit, stake.amount);
            Ok(0)
        }
    }
}
