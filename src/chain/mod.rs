//! Chain access for the VapeGame contract.
//!
//! - [`bindings`]: `sol!`-generated ABI for the functions and events used.
//! - [`reader`]: one-shot view calls over HTTP JSON-RPC.
//! - [`watcher`]: WebSocket subscription to `TookAHit` logs.

pub mod bindings;
pub mod reader;
pub mod watcher;

pub use reader::{
    ContractField, ContractReader, EvmContractReader, FieldValue, ensure_chain, fetch_snapshot,
    read_address, read_uint,
};
pub use watcher::{
    EVENT_NAME, EventWatcher, WatchHandle, group_by_transaction, select_hit, transaction_batches,
};
