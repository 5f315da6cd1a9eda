//! PostgreSQL implementation of the subscriber store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::SubscriberStore;
use crate::config::RelayConfig;
use crate::domain::ChatId;
use crate::error::RelayError;

/// Subscriber store backed by the `chats` table.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from the relay configuration and, when
    /// enabled, applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Store`] if the database cannot be reached or a
    /// migration fails.
    pub async fn connect(config: &RelayConfig) -> Result<Self, RelayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        if config.run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("database migrations applied");
        }

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SubscriberStore for PostgresStore {
    async fn add(&self, chat_id: ChatId) -> Result<bool, RelayError> {
        let result = sqlx::query("INSERT INTO chats (chat_id) VALUES ($1) ON CONFLICT (chat_id) DO NOTHING")
            .bind(chat_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, chat_id: ChatId) -> Result<bool, RelayError> {
        let result = sqlx::query("DELETE FROM chats WHERE chat_id = $1")
            .bind(chat_id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<ChatId>, RelayError> {
        let rows = sqlx::query_scalar::<_, i64>("SELECT chat_id FROM chats")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ChatId::new).collect())
    }

    async fn count(&self) -> Result<u64, RelayError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chats")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(total).unwrap_or(0))
    }
}
