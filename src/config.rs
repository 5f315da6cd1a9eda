//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! Required: `BOT_TOKEN`, `DATABASE_URL`, `RPC_HTTP_URL`, `RPC_WS_URL`,
//! `CONTRACT_ADDRESS`.
//! Optional: `CHAIN_ID`, `LISTEN_ADDR`, `HTTP_ENABLED`,
//! `DATABASE_MAX_CONNECTIONS`, `DATABASE_CONNECT_TIMEOUT_SECS`,
//! `RUN_MIGRATIONS`, `TELEGRAM_API_URL`, `POLL_TIMEOUT_SECS`,
//! `REQUEST_TIMEOUT_SECS`, `WS_RECONNECT_MAX_SECS`, `GAME_URL`,
//! `BUY_URL`, `INFO_URL`, `EXPLORER_ADDRESS_URL`.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;

use crate::error::RelayError;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`] and shared
/// read-only through the [`crate::context::RelayContext`].
#[derive(Clone)]
pub struct RelayConfig {
    /// Telegram bot token issued by BotFather.
    pub bot_token: String,

    /// Base URL of the Bot API (overridable for local bot API servers).
    pub telegram_api_url: String,

    /// Long-poll timeout passed to `getUpdates`, in seconds.
    pub poll_timeout_secs: u64,

    /// PostgreSQL connection string for the `chats` table.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// Apply embedded migrations at startup.
    pub run_migrations: bool,

    /// JSON-RPC endpoint used for contract reads.
    pub rpc_http_url: String,

    /// WebSocket endpoint used for the log subscription.
    pub rpc_ws_url: String,

    /// Chain the contract lives on; endpoints reporting another id are rejected.
    pub chain_id: u64,

    /// Deployed game contract.
    pub contract_address: Address,

    /// Upper bound for a single contract read or Bot API call.
    pub request_timeout: Duration,

    /// Cap for the watcher's reconnect backoff.
    pub ws_reconnect_max: Duration,

    /// Socket address for the health/metrics server.
    pub listen_addr: SocketAddr,

    /// Master switch for the health/metrics server.
    pub http_enabled: bool,

    /// Links rendered into outgoing messages.
    pub links: Links,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bot_token", &"<redacted>")
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("database_url", &"<redacted>")
            .field("database_max_connections", &self.database_max_connections)
            .field("run_migrations", &self.run_migrations)
            .field("rpc_http_url", &"<redacted>")
            .field("rpc_ws_url", &"<redacted>")
            .field("chain_id", &self.chain_id)
            .field("contract_address", &self.contract_address)
            .field("request_timeout", &self.request_timeout)
            .field("listen_addr", &self.listen_addr)
            .field("http_enabled", &self.http_enabled)
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

/// External links used by the message templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    /// Game frontend ("Cmon, Take a Hit!").
    pub game_url: String,
    /// Token swap page ("Buy $ZOOMER").
    pub buy_url: String,
    /// Project homepage ("WTF is $ZOOMER??").
    pub info_url: String,
    /// Block explorer prefix; the address is appended.
    pub explorer_address_url: String,
}

impl Default for Links {
    fn default() -> Self {
        Self {
            game_url: "https://vape.zoomer.money".to_string(),
            buy_url: "https://app.uniswap.org/#/tokens/ethereum/0x0d505c03d30e65f6e9b4ef88855a47a89e4b7676"
                .to_string(),
            info_url: "https://zoomer.money".to_string(),
            explorer_address_url: "https://etherscan.io/address/".to_string(),
        }
    }
}

impl Links {
    /// Returns the explorer page for `address`.
    #[must_use]
    pub fn explorer(&self, address: &Address) -> String {
        format!("{}{address}", self.explorer_address_url)
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if a required variable is missing or
    /// a set variable cannot be parsed.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`RelayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let bot_token = env.required("BOT_TOKEN")?;
        let database_url = env.required("DATABASE_URL")?;
        let rpc_http_url = env.required("RPC_HTTP_URL")?;
        let rpc_ws_url = env.required("RPC_WS_URL")?;
        let contract_address: Address = env.required_parsed("CONTRACT_ADDRESS")?;

        let defaults = Links::default();
        let links = Links {
            game_url: env.or("GAME_URL", defaults.game_url),
            buy_url: env.or("BUY_URL", defaults.buy_url),
            info_url: env.or("INFO_URL", defaults.info_url),
            explorer_address_url: env.or("EXPLORER_ADDRESS_URL", defaults.explorer_address_url),
        };

        Ok(Self {
            bot_token,
            telegram_api_url: env.or("TELEGRAM_API_URL", "https://api.telegram.org".to_string()),
            poll_timeout_secs: env.parsed_or("POLL_TIMEOUT_SECS", 30)?,
            database_url,
            database_max_connections: env.parsed_or("DATABASE_MAX_CONNECTIONS", 5)?,
            database_connect_timeout_secs: env.parsed_or("DATABASE_CONNECT_TIMEOUT_SECS", 5)?,
            run_migrations: env.bool_or("RUN_MIGRATIONS", true),
            rpc_http_url,
            rpc_ws_url,
            chain_id: env.parsed_or("CHAIN_ID", 1)?,
            contract_address,
            request_timeout: Duration::from_secs(env.parsed_or("REQUEST_TIMEOUT_SECS", 15)?),
            ws_reconnect_max: Duration::from_secs(env.parsed_or("WS_RECONNECT_MAX_SECS", 60)?),
            listen_addr: env.parsed_or("LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            http_enabled: env.bool_or("HTTP_ENABLED", true),
            links,
        })
    }

    /// Timeout for one `getUpdates` request: the long-poll window plus
    /// the regular request budget.
    #[must_use]
    pub fn poll_request_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs).saturating_add(self.request_timeout)
    }
}

/// Typed access to a key lookup.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, RelayError> {
        self.get(key)
            .ok_or_else(|| RelayError::Config(format!("{key} env var must be set")))
    }

    fn required_parsed<T: FromStr>(&self, key: &str) -> Result<T, RelayError> {
        let raw = self.required(key)?;
        raw.trim()
            .parse()
            .map_err(|_| RelayError::Config(format!("invalid {key}: {raw}")))
    }

    fn or(&self, key: &str, default: String) -> String {
        self.get(key).unwrap_or(default)
    }

    /// Missing keys fall back to `default`; set but malformed keys are an error.
    fn parsed_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, RelayError> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| RelayError::Config(format!("invalid {key}: {raw}"))),
            None => Ok(default),
        }
    }

    /// Accepts `"true"`, `"1"`, `"false"`, `"0"` (case-insensitive).
    /// Returns `default` otherwise.
    fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("true" | "1") => true,
            Some("false" | "0") => false,
            _ => default,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const CONTRACT: &str = "0x699315bc4dCA38947AD489f4748a172Dba9A16Ff";

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("BOT_TOKEN", "123:abc".to_string()),
            ("DATABASE_URL", "postgres://relay@localhost/relay".to_string()),
            ("RPC_HTTP_URL", "http://localhost:8545".to_string()),
            ("RPC_WS_URL", "ws://localhost:8546".to_string()),
            ("CONTRACT_ADDRESS", CONTRACT.to_string()),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<RelayConfig, RelayError> {
        RelayConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_optional_keys_missing() {
        let Ok(cfg) = load(&base_env()) else {
            panic!("config should load");
        };
        assert_eq!(cfg.chain_id, 1);
        assert_eq!(cfg.poll_timeout_secs, 30);
        assert_eq!(cfg.request_timeout, Duration::from_secs(15));
        assert!(cfg.http_enabled);
        assert!(cfg.run_migrations);
        assert_eq!(cfg.links, Links::default());
        assert_eq!(cfg.contract_address.to_checksum(None), CONTRACT);
    }

    #[test]
    fn each_required_key_is_fatal_when_missing() {
        for key in [
            "BOT_TOKEN",
            "DATABASE_URL",
            "RPC_HTTP_URL",
            "RPC_WS_URL",
            "CONTRACT_ADDRESS",
        ] {
            let mut env = base_env();
            env.remove(key);
            let Err(err) = load(&env) else {
                panic!("{key} should be required");
            };
            assert!(matches!(err, RelayError::Config(_)));
            assert!(err.to_string().contains(key));
        }
    }

    #[test]
    fn blank_required_key_counts_as_missing() {
        let mut env = base_env();
        env.insert("BOT_TOKEN", "   ".to_string());
        assert!(load(&env).is_err());
    }

    #[test]
    fn malformed_optional_key_is_rejected() {
        let mut env = base_env();
        env.insert("CHAIN_ID", "mainnet".to_string());
        let Err(RelayError::Config(msg)) = load(&env) else {
            panic!("expected config error");
        };
        assert!(msg.contains("CHAIN_ID"));
    }

    #[test]
    fn malformed_contract_address_is_rejected() {
        let mut env = base_env();
        env.insert("CONTRACT_ADDRESS", "0x1234".to_string());
        assert!(load(&env).is_err());
    }

    #[test]
    fn overrides_are_applied() {
        let mut env = base_env();
        env.insert("CHAIN_ID", "5".to_string());
        env.insert("HTTP_ENABLED", "FALSE".to_string());
        env.insert("GAME_URL", "https://zoomer-vape-ui.vercel.app".to_string());
        let Ok(cfg) = load(&env) else {
            panic!("config should load");
        };
        assert_eq!(cfg.chain_id, 5);
        assert!(!cfg.http_enabled);
        assert_eq!(cfg.links.game_url, "https://zoomer-vape-ui.vercel.app");
    }

    #[test]
    fn debug_redacts_secrets() {
        let Ok(cfg) = load(&base_env()) else {
            panic!("config should load");
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("123:abc"));
        assert!(!rendered.contains("postgres://"));
    }

    #[test]
    fn explorer_link_appends_address() {
        let links = Links::default();
        assert_eq!(
            links.explorer(&Address::ZERO),
            "https://etherscan.io/address/0x0000000000000000000000000000000000000000"
        );
    }
}
