//! `TookAHit` log subscription.
//!
//! [`EventWatcher::subscribe`] spawns a background task that keeps one
//! WebSocket log subscription open for the game contract, hands every
//! batch of logs to a callback, and reconnects with capped exponential
//! backoff when the stream drops. The returned [`WatchHandle`] cancels
//! the task.
//!
//! A batch holds the consecutive logs of one transaction, so every
//! transaction that emits a hit is announced on its own. The callback
//! picks the matching entry with [`select_hit`].

use std::future::Future;
use std::time::Duration;

use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;
use futures_util::{Stream, StreamExt, stream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::bindings::VapeGame;
use super::reader::ensure_chain;
use crate::backoff::backoff_delay;
use crate::config::RelayConfig;
use crate::domain::HitEvent;
use crate::error::RelayError;

/// Name of the watched event.
pub const EVENT_NAME: &str = "TookAHit";

/// Upper bound on the number of ready logs pulled off the socket at once.
const MAX_READY: usize = 64;

/// Budget for the startup chain check when none is configured.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Returns the first `TookAHit` entry in `batch`, decoded.
///
/// Entries with another signature, or that fail to decode, are skipped.
/// Returns `None` when nothing matches.
#[must_use]
pub fn select_hit(batch: &[Log]) -> Option<HitEvent> {
    batch.iter().find_map(decode_hit)
}

/// Splits logs into runs of consecutive entries from the same transaction.
///
/// A log without a transaction hash is always its own batch.
#[must_use]
pub fn group_by_transaction(logs: Vec<Log>) -> Vec<Vec<Log>> {
    let mut groups: Vec<Vec<Log>> = Vec::new();
    for log in logs {
        let same_tx = log.transaction_hash.is_some()
            && groups
                .last()
                .and_then(|g| g.last())
                .is_some_and(|prev| prev.transaction_hash == log.transaction_hash);
        match groups.last_mut() {
            Some(group) if same_tx => group.push(log),
            _ => groups.push(vec![log]),
        }
    }
    groups
}

/// Turns a log stream into per-transaction batches.
///
/// Logs already waiting are drained together, then regrouped, so hits
/// that pile up while a broadcast runs are still delivered one by one.
pub fn transaction_batches<S>(logs: S) -> impl Stream<Item = Vec<Log>>
where
    S: Stream<Item = Log>,
{
    logs.ready_chunks(MAX_READY)
        .flat_map(|ready| stream::iter(group_by_transaction(ready)))
}

fn decode_hit(log: &Log) -> Option<HitEvent> {
    if log.topic0() != Some(&VapeGame::TookAHit::SIGNATURE_HASH) {
        return None;
    }
    match log.log_decode::<VapeGame::TookAHit>() {
        Ok(decoded) => {
            let hit = &decoded.inner.data;
            Some(HitEvent {
                user: hit.user,
                amount: hit.amount,
                vape_token_value: hit.vapeTokenValue,
                pot_value: hit.potValueETH,
                lotto_value: hit.lottoValueETH,
                total_dividends: hit.totalDividendsValueETH,
                next_hit_price: hit.nextHitPrice,
                block_number: log.block_number,
                transaction_hash: log.transaction_hash,
            })
        }
        Err(e) => {
            warn!(error = %e, tx = ?log.transaction_hash, "malformed TookAHit log, skipping");
            None
        }
    }
}

/// Why a single WebSocket session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The handle asked us to stop.
    Shutdown,
    /// The node closed the subscription stream.
    StreamClosed,
}

/// Watches the game contract for `TookAHit` logs.
#[derive(Debug, Clone)]
pub struct EventWatcher {
    ws_url: String,
    chain_id: u64,
    contract: Address,
    reconnect_max: Duration,
    connect_timeout: Duration,
}

impl EventWatcher {
    /// Creates a watcher for an explicit endpoint and contract.
    #[must_use]
    pub fn new(ws_url: impl Into<String>, chain_id: u64, contract: Address, reconnect_max: Duration) -> Self {
        Self {
            ws_url: ws_url.into(),
            chain_id,
            contract,
            reconnect_max,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the time allowed for [`EventWatcher::verify_chain`].
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Creates a watcher from the relay configuration.
    #[must_use]
    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(
            config.rpc_ws_url.clone(),
            config.chain_id,
            config.contract_address,
            config.ws_reconnect_max,
        )
        .with_connect_timeout(config.request_timeout)
    }

    /// Connects once and checks that the WebSocket endpoint serves the
    /// configured chain.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::RemoteCall`] if the endpoint is unreachable,
    /// does not answer in time, or reports another chain id.
    pub async fn verify_chain(&self) -> Result<(), RelayError> {
        let check = async {
            let provider = ProviderBuilder::new()
                .connect_ws(WsConnect::new(self.ws_url.as_str()))
                .await?;
            let reported = provider.get_chain_id().await?;
            ensure_chain(self.chain_id, reported)
        };
        match tokio::time::timeout(self.connect_timeout, check).await {
            Ok(result) => result,
            Err(_) => Err(RelayError::RemoteCall(format!(
                "websocket chain check timed out after {}s",
                self.connect_timeout.as_secs()
            ))),
        }
    }

    /// Log filter: the game contract, `TookAHit` signature only.
    #[must_use]
    pub fn filter(&self) -> Filter {
        Filter::new()
            .address(self.contract)
            .event_signature(VapeGame::TookAHit::SIGNATURE_HASH)
    }

    /// Starts the subscription in a background task and returns its handle.
    ///
    /// `on_batch` runs once per batch, in order; the next batch is not
    /// read until it returns.
    pub fn subscribe<F, Fut>(self, on_batch: F) -> WatchHandle
    where
        F: Fn(Vec<Log>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            self.run_forever(on_batch, shutdown_rx).await;
        });
        WatchHandle { shutdown, task }
    }

    /// Connect, stream, reconnect. Returns on shutdown only.
    async fn run_forever<F, Fut>(&self, on_batch: F, mut shutdown: watch::Receiver<bool>)
    where
        F: Fn(Vec<Log>) -> Fut + Send + Sync,
        Fut: Future<Output = ()> + Send,
    {
        let mut consecutive_failures: u32 = 0;

        loop {
            info!(event = EVENT_NAME, contract = %self.contract, "connecting log subscription");

            match self.run_session(&on_batch, &mut shutdown).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::StreamClosed) => {
                    warn!("log stream ended, reconnecting");
                    consecutive_failures = 0;
                }
                Err(e) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    error!(error = %e, failures = consecutive_failures, "log subscription failed");
                }
            }

            let delay = backoff_delay(consecutive_failures, self.reconnect_max);
            info!(delay_secs = delay.as_secs(), "reconnecting log subscription");
            tokio::select! {
                _ = shutdown.changed() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        info!("log subscription stopped");
    }

    /// A single WebSocket session: connect, verify chain, stream batches.
    async fn run_session<F, Fut>(
        &self,
        on_batch: &F,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<SessionEnd, RelayError>
    where
        F: Fn(Vec<Log>) -> Fut + Send + Sync,
        Fut: Future<Output = ()> + Send,
    {
        let connect = async {
            let provider = ProviderBuilder::new()
                .connect_ws(WsConnect::new(self.ws_url.as_str()))
                .await?;

            let reported = provider.get_chain_id().await?;
            ensure_chain(self.chain_id, reported)?;

            let subscription = provider.subscribe_logs(&self.filter()).await?;
            Ok::<_, RelayError>((provider, subscription, reported))
        };

        // The provider must outlive the stream.
        let (_provider, subscription, reported) = tokio::select! {
            _ = shutdown.changed() => return Ok(SessionEnd::Shutdown),
            connected = connect => connected?,
        };
        let mut batches = std::pin::pin!(transaction_batches(subscription.into_stream()));
        info!(chain_id = reported, event = EVENT_NAME, "log subscription active");

        loop {
            tokio::select! {
                _ = shutdown.changed() => return Ok(SessionEnd::Shutdown),
                batch = batches.next() => match batch {
                    Some(batch) => {
                        debug!(size = batch.len(), "log batch received");
                        on_batch(batch).await;
                    }
                    None => return Ok(SessionEnd::StreamClosed),
                },
            }
        }
    }
}

/// Owner of a running log subscription.
///
/// Dropping the handle also stops the task, without waiting for it;
/// call [`WatchHandle::unsubscribe`] for an orderly stop.
#[derive(Debug)]
pub struct WatchHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Cancels the subscription and waits for the task to exit.
    ///
    /// A batch already being handled runs to completion first.
    pub async fn unsubscribe(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "log watcher task panicked");
        }
    }
}
