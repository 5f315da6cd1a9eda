//! vapegame-relay entry point.
//!
//! Connects the store, contract reader and Bot API, then runs the log
//! watcher, the update poller and the ops server until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vapegame_relay::api;
use vapegame_relay::chain::{EventWatcher, EvmContractReader};
use vapegame_relay::config::RelayConfig;
use vapegame_relay::context::RelayContext;
use vapegame_relay::service::on_log_batch;
use vapegame_relay::store::PostgresStore;
use vapegame_relay::telegram::{BotApi, UpdatePoller};

const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn,reqwest=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = RelayConfig::from_env().context("loading configuration")?;
    info!(
        chain_id = config.chain_id,
        contract = %config.contract_address,
        "starting vapegame-relay"
    );

    // External services
    let store = PostgresStore::connect(&config)
        .await
        .context("connecting subscriber store")?;
    let reader = EvmContractReader::connect(&config)
        .await
        .context("connecting contract reader")?;
    let watcher = EventWatcher::from_config(&config);
    watcher
        .verify_chain()
        .await
        .context("checking websocket endpoint")?;
    let bot = Arc::new(BotApi::new(&config)?);
    let me = bot.get_me().await.context("verifying bot token")?;
    info!(bot = ?me.username, "bot authenticated");

    let ctx = RelayContext::new(
        Arc::new(store),
        Arc::clone(&bot) as _,
        Arc::new(reader),
        config.links.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Chain events
    let watcher_ctx = ctx.clone();
    let watch_handle = watcher.subscribe(move |batch| on_log_batch(watcher_ctx.clone(), batch));

    // Bot commands
    let poller = UpdatePoller::new(Arc::clone(&bot), ctx.clone(), me.username, config.ws_reconnect_max)
        .spawn(shutdown_rx.clone());

    // Ops HTTP
    let server = if config.http_enabled {
        let listener = tokio::net::TcpListener::bind(config.listen_addr)
            .await
            .with_context(|| format!("binding {}", config.listen_addr))?;
        info!(addr = %config.listen_addr, "ops server listening");
        let mut rx = shutdown_rx.clone();
        let app = api::build_router(ctx.clone());
        Some(tokio::spawn(async move {
            let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = rx.changed().await;
            });
            if let Err(e) = graceful.await {
                error!(error = %e, "ops server failed");
            }
        }))
    } else {
        None
    };

    shutdown_signal().await;
    info!("shutting down");

    let _ = shutdown_tx.send(true);
    watch_handle.unsubscribe().await;
    if let Err(e) = poller.await {
        error!(error = %e, "update poller task panicked");
    }
    if let Some(server) = server {
        if let Err(e) = server.await {
            error!(error = %e, "ops server task panicked");
        }
    }

    info!("shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "ctrl-c handler failed");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
