use crate::store::{RefreshTokenStore, StoredRefreshToken};
use api_error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn insert(&self, user_id: i64, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume(&self, token: &str) -> Result<Option<StoredRefreshToken>> {
        // Single conditional DELETE: two concurrent refreshes presenting the
        // same token cannot both get a row back.
        let record = sqlx::query_as::<_, StoredRefreshToken>(
            r#"
            DELETE FROM refresh_tokens
            WHERE token = $1 AND expires_at > CURRENT_TIMESTAMP
            RETURNING user_id, token, expires_at
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete(&self, token: &str) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM refresh_tokens WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens WHERE expires_at <= CURRENT_TIMESTAMP
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
