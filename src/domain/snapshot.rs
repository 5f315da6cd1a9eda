//! Read-only view of the game contract's state.
//!
//! A [`ContractSnapshot`] is fetched fresh for every status query and
//! dropped afterwards. Nothing in it is persisted.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};

/// Current values of the contract fields shown by the status command.
///
/// All `U256` amounts are in wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSnapshot {
    /// Price of the next hit (`minInvest`).
    pub next_hit_price: U256,
    /// Pot paid to the last taker when the battery dies (`potValueETH`).
    pub pot_value: U256,
    /// Lotto prize for a random taker (`lottoValueETH`).
    pub lotto_value: U256,
    /// Dividend pool shared among takers (`totalDividendsValueETH`).
    pub total_dividends: U256,
    /// Unix timestamp of the last hit (`lastPurchasedTime`).
    pub last_purchased_time: U256,
    /// Address that took the last hit (`lastPurchasedAddress`).
    pub last_purchased_address: Address,
    /// Round length in seconds (`GAME_TIME`).
    pub game_time: U256,
    /// Number of hits taken this round (`numHits`).
    pub num_hits: U256,
}

impl ContractSnapshot {
    /// Computes `lastPurchasedTime + GAME_TIME - now`.
    #[must_use]
    pub fn time_remaining(&self, now: DateTime<Utc>) -> TimeRemaining {
        let deadline = self
            .last_purchased_time
            .saturating_add(self.game_time)
            .saturating_to::<u64>();
        let now_secs = u64::try_from(now.timestamp()).unwrap_or(0);
        TimeRemaining::from_seconds(deadline.saturating_sub(now_secs))
    }
}

/// Countdown until the round ends.
///
/// A deadline at or before `now` is [`TimeRemaining::Expired`]; the
/// countdown never renders negative components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    /// Round still running.
    Running {
        /// Whole hours left. Not wrapped at 24.
        hours: u64,
        /// Minutes past the last whole hour.
        minutes: u64,
        /// Seconds past the last whole minute.
        seconds: u64,
    },
    /// Deadline already passed; the round is waiting to be settled.
    Expired,
}

impl TimeRemaining {
    /// Splits a remaining duration in seconds into h/m/s.
    #[must_use]
    pub const fn from_seconds(secs: u64) -> Self {
        if secs == 0 {
            return Self::Expired;
        }
        Self::Running {
            hours: secs / 3600,
            minutes: (secs % 3600) / 60,
            seconds: secs % 60,
        }
    }
}
