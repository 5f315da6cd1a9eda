//! In-process fakes shared by unit tests.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::chain::bindings::VapeGame;
use crate::chain::{ContractField, ContractReader, FieldValue};
use crate::config::RelayConfig;
use crate::domain::ChatId;
use crate::error::RelayError;
use crate::message::OutgoingMessage;
use crate::service::Messenger;
use crate::store::SubscriberStore;

const WEI_PER_MILLI: u64 = 1_000_000_000_000_000;

/// Contract reader answering from fixed values.
#[derive(Debug, Clone)]
pub struct FixedReader {
    pub next_hit_price: U256,
    pub pot_value: U256,
    pub lotto_value: U256,
    pub total_dividends: U256,
    pub last_purchased_time: U256,
    pub last_purchased_address: Address,
    pub game_time: U256,
    pub num_hits: U256,
    pub fail_on: Option<ContractField>,
}

impl Default for FixedReader {
    fn default() -> Self {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        Self {
            next_hit_price: U256::from(1230 * WEI_PER_MILLI),
            pot_value: U256::from(5000 * WEI_PER_MILLI),
            lotto_value: U256::from(500 * WEI_PER_MILLI),
            total_dividends: U256::from(250 * WEI_PER_MILLI),
            last_purchased_time: U256::from(now),
            last_purchased_address: Address::repeat_byte(0xab),
            game_time: U256::from(24 * 3600u64),
            num_hits: U256::from(17u8),
            fail_on: None,
        }
    }
}

impl FixedReader {
    pub fn failing_on(field: ContractField) -> Self {
        Self {
            fail_on: Some(field),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ContractReader for FixedReader {
    async fn read_field(&self, field: ContractField) -> Result<FieldValue, RelayError> {
        if self.fail_on == Some(field) {
            return Err(RelayError::RemoteCall(format!("{} unavailable", field.function_name())));
        }
        Ok(match field {
            ContractField::NextHitPrice => FieldValue::Uint(self.next_hit_price),
            ContractField::PotValue => FieldValue::Uint(self.pot_value),
            ContractField::LottoValue => FieldValue::Uint(self.lotto_value),
            ContractField::TotalDividends => FieldValue::Uint(self.total_dividends),
            ContractField::LastPurchasedTime => FieldValue::Uint(self.last_purchased_time),
            ContractField::LastPurchasedAddress => FieldValue::Address(self.last_purchased_address),
            ContractField::GameTime => FieldValue::Uint(self.game_time),
            ContractField::NumHits => FieldValue::Uint(self.num_hits),
        })
    }
}

/// Messenger that records every accepted message and rejects chosen chats.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(ChatId, OutgoingMessage)>>,
    fail_for: BTreeSet<ChatId>,
    delay: Option<Duration>,
}

impl RecordingMessenger {
    pub fn failing_for(chats: impl IntoIterator<Item = ChatId>) -> Self {
        Self {
            fail_for: chats.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Each send takes `delay` before it is recorded.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<(ChatId, OutgoingMessage)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<(), RelayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_for.contains(&chat_id) {
            return Err(RelayError::Delivery {
                chat_id,
                reason: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.sent.lock().await.push((chat_id, message.clone()));
        Ok(())
    }
}

/// Store whose backend is always down.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl SubscriberStore for FailingStore {
    async fn add(&self, _chat_id: ChatId) -> Result<bool, RelayError> {
        Err(down())
    }

    async fn remove(&self, _chat_id: ChatId) -> Result<bool, RelayError> {
        Err(down())
    }

    async fn list_all(&self) -> Result<Vec<ChatId>, RelayError> {
        Err(down())
    }

    async fn count(&self) -> Result<u64, RelayError> {
        Err(down())
    }
}

fn down() -> RelayError {
    RelayError::Store("connection refused".to_string())
}

pub fn sample_hit(next_hit_price_wei: u64) -> VapeGame::TookAHit {
    VapeGame::TookAHit {
        user: Address::repeat_byte(0xaa),
        amount: U256::from(50 * WEI_PER_MILLI),
        vapeTokenValue: U256::from(1_000u32),
        potValueETH: U256::from(3500 * WEI_PER_MILLI),
        lottoValueETH: U256::from(1000 * WEI_PER_MILLI),
        totalDividendsValueETH: U256::from(250 * WEI_PER_MILLI),
        nextHitPrice: U256::from(next_hit_price_wei),
    }
}

pub fn hit_log(event: &VapeGame::TookAHit) -> Log {
    rpc_log(event.encode_log_data())
}

/// A `TookAHit` log as mined in block `block` by transaction `tx`.
pub fn hit_log_at(event: &VapeGame::TookAHit, block: u64, tx: B256) -> Log {
    Log {
        block_number: Some(block),
        transaction_hash: Some(tx),
        ..hit_log(event)
    }
}

pub fn last_hit_log() -> Log {
    let event = VapeGame::TookTheLastHit {
        user: Address::repeat_byte(0xbb),
        amount: U256::from(WEI_PER_MILLI),
    };
    rpc_log(event.encode_log_data())
}

fn rpc_log(data: alloy::primitives::LogData) -> Log {
    Log {
        inner: alloy::primitives::Log {
            address: Address::repeat_byte(0x42),
            data,
        },
        block_number: Some(19_000_000),
        ..Default::default()
    }
}

/// Bot token the mock Bot API answers for.
pub const MOCK_TOKEN: &str = "test-token";

/// Configuration pointing the Bot API client at `api_url` with a
/// zero-second long poll.
#[allow(clippy::panic)]
pub fn bot_config(api_url: &str) -> RelayConfig {
    let env = HashMap::from([
        ("BOT_TOKEN", MOCK_TOKEN.to_string()),
        ("DATABASE_URL", "postgres://relay@localhost/relay".to_string()),
        ("RPC_HTTP_URL", "http://localhost:8545".to_string()),
        ("RPC_WS_URL", "ws://localhost:8546".to_string()),
        ("CONTRACT_ADDRESS", Address::repeat_byte(0x42).to_string()),
        ("TELEGRAM_API_URL", api_url.to_string()),
        ("POLL_TIMEOUT_SECS", "0".to_string()),
        ("REQUEST_TIMEOUT_SECS", "2".to_string()),
        ("WS_RECONNECT_MAX_SECS", "1".to_string()),
    ]);
    let Ok(config) = RelayConfig::from_lookup(|key| env.get(key).cloned()) else {
        panic!("test config should load");
    };
    config
}

#[derive(Debug, Default)]
struct MockState {
    calls: Mutex<Vec<(String, Value)>>,
    queued: Mutex<HashMap<String, VecDeque<(StatusCode, String)>>>,
}

/// Local Bot API served by axum on an ephemeral port.
///
/// Every call is recorded. Queued answers are returned first, in order;
/// after that each method gets a canned success.
#[derive(Debug, Clone, Default)]
pub struct MockBotApi {
    state: Arc<MockState>,
}

impl MockBotApi {
    /// Queues a JSON answer for the next call to `method`.
    pub async fn respond(&self, method: &str, status: StatusCode, body: Value) {
        self.respond_raw(method, status, &body.to_string()).await;
    }

    /// Queues a raw body for the next call to `method`.
    pub async fn respond_raw(&self, method: &str, status: StatusCode, body: &str) {
        self.state
            .queued
            .lock()
            .await
            .entry(method.to_string())
            .or_default()
            .push_back((status, body.to_string()));
    }

    /// Request bodies received for `method`, oldest first.
    pub async fn calls(&self, method: &str) -> Vec<Value> {
        self.state
            .calls
            .lock()
            .await
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Waits until `method` has been called at least `count` times.
    #[allow(clippy::panic)]
    pub async fn wait_for(&self, method: &str, count: usize) -> Vec<Value> {
        let waited = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let calls = self.calls(method).await;
                if calls.len() >= count {
                    return calls;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        let Ok(calls) = waited else {
            panic!("{method} was not called {count} times");
        };
        calls
    }

    /// Starts serving and returns the base URL to configure.
    #[allow(clippy::panic)]
    pub async fn serve(&self) -> String {
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("mock bot api cannot bind");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("mock bot api has no address");
        };
        let app = Router::new()
            .route(&format!("/bot{MOCK_TOKEN}/{{method}}"), post(mock_method))
            .with_state(Arc::clone(&self.state));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }
}

async fn mock_method(
    State(state): State<Arc<MockState>>,
    Path(method): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.calls.lock().await.push((method.clone(), body));
    let queued = state
        .queued
        .lock()
        .await
        .get_mut(&method)
        .and_then(VecDeque::pop_front);

    let (status, body) = match queued {
        Some(answer) => answer,
        None => (StatusCode::OK, canned_answer(&method).await),
    };
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

async fn canned_answer(method: &str) -> String {
    let result = match method {
        "getMe" => json!({"id": 1, "is_bot": true, "first_name": "Vape", "username": "VapeBot"}),
        "sendMessage" => json!({"message_id": 1}),
        "getUpdates" => {
            // Stand-in for an empty long poll.
            tokio::time::sleep(Duration::from_millis(20)).await;
            json!([])
        }
        _ => return json!({"ok": false, "error_code": 404, "description": "Not Found"}).to_string(),
    };
    json!({"ok": true, "result": result}).to_string()
}
