//! Read-only calls against the game contract.
//!
//! Every read is an independent best-effort attempt: no retry, no cache.
//! [`EvmContractReader`] bounds each call with the configured request
//! timeout so a stalled node cannot hang a command.

use std::fmt::Debug;
use std::future::IntoFuture;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;

use super::bindings::VapeGame;
use crate::config::RelayConfig;
use crate::domain::ContractSnapshot;
use crate::error::RelayError;

/// Contract fields the relay reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractField {
    /// `minInvest`, the price of the next hit.
    NextHitPrice,
    /// `potValueETH`.
    PotValue,
    /// `lottoValueETH`.
    LottoValue,
    /// `totalDividendsValueETH`.
    TotalDividends,
    /// `lastPurchasedTime`.
    LastPurchasedTime,
    /// `lastPurchasedAddress`.
    LastPurchasedAddress,
    /// `GAME_TIME`.
    GameTime,
    /// `numHits`.
    NumHits,
}

impl ContractField {
    /// Solidity accessor name.
    #[must_use]
    pub const fn function_name(self) -> &'static str {
        match self {
            Self::NextHitPrice => "minInvest",
            Self::PotValue => "potValueETH",
            Self::LottoValue => "lottoValueETH",
            Self::TotalDividends => "totalDividendsValueETH",
            Self::LastPurchasedTime => "lastPurchasedTime",
            Self::LastPurchasedAddress => "lastPurchasedAddress",
            Self::GameTime => "GAME_TIME",
            Self::NumHits => "numHits",
        }
    }
}

/// Value returned by a field read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    /// `uint256` result.
    Uint(U256),
    /// `address` result.
    Address(Address),
}

/// Typed read access to the game contract.
#[async_trait]
pub trait ContractReader: Send + Sync + Debug {
    /// Reads the current value of `field`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::RemoteCall`] if the node is unreachable, the
    /// response cannot be decoded, or the call times out.
    async fn read_field(&self, field: ContractField) -> Result<FieldValue, RelayError>;
}

/// Reads a `uint256` field.
///
/// # Errors
///
/// Propagates the read error, or returns [`RelayError::RemoteCall`] if the
/// reader answered with a value of the wrong type.
pub async fn read_uint(reader: &dyn ContractReader, field: ContractField) -> Result<U256, RelayError> {
    match reader.read_field(field).await? {
        FieldValue::Uint(v) => Ok(v),
        FieldValue::Address(_) => Err(type_mismatch(field, "uint256")),
    }
}

/// Reads an `address` field.
///
/// # Errors
///
/// Propagates the read error, or returns [`RelayError::RemoteCall`] if the
/// reader answered with a value of the wrong type.
pub async fn read_address(
    reader: &dyn ContractReader,
    field: ContractField,
) -> Result<Address, RelayError> {
    match reader.read_field(field).await? {
        FieldValue::Address(a) => Ok(a),
        FieldValue::Uint(_) => Err(type_mismatch(field, "address")),
    }
}

fn type_mismatch(field: ContractField, expected: &str) -> RelayError {
    RelayError::RemoteCall(format!(
        "{} returned an unexpected type, expected {expected}",
        field.function_name()
    ))
}

/// Reads every status field concurrently.
///
/// # Errors
///
/// Returns the first read failure; the remaining reads are dropped.
pub async fn fetch_snapshot(reader: &dyn ContractReader) -> Result<ContractSnapshot, RelayError> {
    let (
        next_hit_price,
        pot_value,
        lotto_value,
        total_dividends,
        last_purchased_time,
        last_purchased_address,
        game_time,
        num_hits,
    ) = tokio::try_join!(
        read_uint(reader, ContractField::NextHitPrice),
        read_uint(reader, ContractField::PotValue),
        read_uint(reader, ContractField::LottoValue),
        read_uint(reader, ContractField::TotalDividends),
        read_uint(reader, ContractField::LastPurchasedTime),
        read_address(reader, ContractField::LastPurchasedAddress),
        read_uint(reader, ContractField::GameTime),
        read_uint(reader, ContractField::NumHits),
    )?;

    Ok(ContractSnapshot {
        next_hit_price,
        pot_value,
        lotto_value,
        total_dividends,
        last_purchased_time,
        last_purchased_address,
        game_time,
        num_hits,
    })
}

/// Fails unless the endpoint reports the configured chain.
///
/// # Errors
///
/// Returns [`RelayError::RemoteCall`] describing both chain ids.
pub fn ensure_chain(expected: u64, reported: u64) -> Result<(), RelayError> {
    if expected == reported {
        Ok(())
    } else {
        Err(RelayError::RemoteCall(format!(
            "chain mismatch: configured {expected}, endpoint reports {reported}"
        )))
    }
}

/// [`ContractReader`] over an HTTP JSON-RPC provider.
#[derive(Debug, Clone)]
pub struct EvmContractReader {
    contract: VapeGame::VapeGameInstance<DynProvider>,
    timeout: Duration,
}

impl EvmContractReader {
    /// Connects to `RPC_HTTP_URL` and verifies the chain id.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] for a malformed URL and
    /// [`RelayError::RemoteCall`] if the node is unreachable or serves a
    /// different chain.
    pub async fn connect(config: &RelayConfig) -> Result<Self, RelayError> {
        let url: Url = config
            .rpc_http_url
            .parse()
            .map_err(|e| RelayError::Config(format!("invalid RPC_HTTP_URL: {e}")))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        let reported = bounded(config.request_timeout, "eth_chainId", provider.get_chain_id()).await?;
        ensure_chain(config.chain_id, reported)?;

        tracing::info!(
            chain_id = reported,
            contract = %config.contract_address,
            "contract reader connected"
        );

        Ok(Self {
            contract: VapeGame::new(config.contract_address, provider),
            timeout: config.request_timeout,
        })
    }
}

#[async_trait]
impl ContractReader for EvmContractReader {
    async fn read_field(&self, field: ContractField) -> Result<FieldValue, RelayError> {
        let c = &self.contract;
        let name = field.function_name();
        let t = self.timeout;
        let value = match field {
            ContractField::NextHitPrice => FieldValue::Uint(bounded(t, name, c.minInvest().call()).await?),
            ContractField::PotValue => FieldValue::Uint(bounded(t, name, c.potValueETH().call()).await?),
            ContractField::LottoValue => FieldValue::Uint(bounded(t, name, c.lottoValueETH().call()).await?),
            ContractField::TotalDividends => {
                FieldValue::Uint(bounded(t, name, c.totalDividendsValueETH().call()).await?)
            }
            ContractField::LastPurchasedTime => {
                FieldValue::Uint(bounded(t, name, c.lastPurchasedTime().call()).await?)
            }
            ContractField::LastPurchasedAddress => {
                FieldValue::Address(bounded(t, name, c.lastPurchasedAddress().call()).await?)
            }
            ContractField::GameTime => FieldValue::Uint(bounded(t, name, c.GAME_TIME().call()).await?),
            ContractField::NumHits => FieldValue::Uint(bounded(t, name, c.numHits().call()).await?),
        };
        tracing::debug!(field = name, ?value, "contract field read");
        Ok(value)
    }
}

/// Awaits `call` for at most `timeout`.
async fn bounded<F, T, E>(timeout: Duration, what: &str, call: F) -> Result<T, RelayError>
where
    F: IntoFuture<Output = Result<T, E>>,
    E: Into<RelayError>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(RelayError::RemoteCall(format!(
            "{what} timed out after {}s",
            timeout.as_secs()
        ))),
    }
}
