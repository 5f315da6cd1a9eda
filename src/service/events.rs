//! `TookAHit` batch handling: select, enrich, load subscribers, fan out.

use alloy::rpc::types::Log;
use tracing::{debug, error, info};

use crate::chain::{ContractField, read_uint, select_hit};
use crate::context::RelayContext;
use crate::error::RelayError;
use crate::message::templates;
use crate::service::notifier::{BroadcastReport, broadcast};

/// Handles one batch of logs from the watcher.
///
/// Picks the first `TookAHit` entry, reads `numHits` and `GAME_TIME`,
/// loads every subscriber and broadcasts the alert. Returns `Ok(None)`
/// when the batch holds no matching entry.
///
/// # Errors
///
/// Returns [`RelayError::RemoteCall`] if a supplementary read fails and
/// [`RelayError::Store`] if subscribers cannot be loaded. Nothing is sent
/// in either case. Per-recipient delivery failures are reported in the
/// [`BroadcastReport`], not as an error.
pub async fn handle_hit_batch(ctx: &RelayContext, batch: &[Log]) -> Result<Option<BroadcastReport>, RelayError> {
    let Some(hit) = select_hit(batch) else {
        debug!(size = batch.len(), "no TookAHit entry in batch");
        return Ok(None);
    };

    let reader = ctx.contract.as_ref();
    let (num_hits, game_time) = tokio::try_join!(
        read_uint(reader, ContractField::NumHits),
        read_uint(reader, ContractField::GameTime),
    )?;

    let recipients = ctx.store.list_all().await?;
    let message = templates::hit_alert(&hit, num_hits, game_time, &ctx.links);
    let report = broadcast(ctx.messenger.as_ref(), &message, &recipients).await;

    info!(
        user = %hit.user,
        block = ?hit.block_number,
        recipients = recipients.len(),
        delivered = report.delivered(),
        failed = report.failed(),
        "hit alert broadcast"
    );
    Ok(Some(report))
}

/// Watcher callback: runs [`handle_hit_batch`] and records the outcome.
///
/// Errors end here; the watcher keeps running.
pub async fn on_log_batch(ctx: RelayContext, batch: Vec<Log>) {
    ctx.metrics.record_batch();
    match handle_hit_batch(&ctx, &batch).await {
        Ok(Some(report)) => ctx.metrics.record_broadcast(report.delivered(), report.failed()),
        Ok(None) => {}
        Err(e) => {
            ctx.metrics.record_event_failure();
            error!(error = %e, kind = e.kind(), "hit alert abandoned");
        }
    }
}
