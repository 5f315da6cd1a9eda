//! Decoded `TookAHit` event.

use alloy::primitives::{Address, B256, U256};

/// One `TookAHit` log, decoded and detached from the RPC log envelope.
///
/// All `U256` amounts are in wei and reflect contract state right after
/// the hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitEvent {
    /// Address that took the hit.
    pub user: Address,
    /// Amount paid for the hit.
    pub amount: U256,
    /// VAPE tokens minted to the taker.
    pub vape_token_value: U256,
    /// Pot value after the hit.
    pub pot_value: U256,
    /// Lotto value after the hit.
    pub lotto_value: U256,
    /// Dividend pool after the hit.
    pub total_dividends: U256,
    /// Price of the following hit.
    pub next_hit_price: U256,
    /// Block that included the log, when the node reported it.
    pub block_number: Option<u64>,
    /// Transaction that emitted the log, when the node reported it.
    pub transaction_hash: Option<B256>,
}
