//! Relay context shared by every handler.

use std::sync::Arc;

use crate::chain::ContractReader;
use crate::config::Links;
use crate::metrics::RelayMetrics;
use crate::service::Messenger;
use crate::store::SubscriberStore;

/// Everything a command or event handler needs, built once at startup.
///
/// Cloning is cheap: every field is reference counted. The same value is
/// used as the axum router state.
#[derive(Debug, Clone)]
pub struct RelayContext {
    /// Subscribed chats.
    pub store: Arc<dyn SubscriberStore>,
    /// Outbound chat transport.
    pub messenger: Arc<dyn Messenger>,
    /// Game contract reads.
    pub contract: Arc<dyn ContractReader>,
    /// Button and explorer URLs.
    pub links: Arc<Links>,
    /// Relay counters.
    pub metrics: Arc<RelayMetrics>,
}

impl RelayContext {
    /// Creates a context with fresh metrics.
    #[must_use]
    pub fn new(
        store: Arc<dyn SubscriberStore>,
        messenger: Arc<dyn Messenger>,
        contract: Arc<dyn ContractReader>,
        links: Links,
    ) -> Self {
        Self {
            store,
            messenger,
            contract,
            links: Arc::new(links),
            metrics: Arc::new(RelayMetrics::new()),
        }
    }
}
