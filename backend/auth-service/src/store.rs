//! Store traits injected into [`crate::services::AuthService`].
//!
//! Postgres implementations live in [`crate::db`]; tests run against
//! in-memory implementations. Either way, `consume` carries the one
//! correctness-critical guarantee in this subsystem.

use crate::models::User;
use api_error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use token_core::Role;

/// One row per active refresh token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredRefreshToken {
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// User records. Owns password hashes; no token logic.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `Conflict` when the email is already taken.
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
    ) -> Result<User>;

    /// Case-insensitive email lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn touch_last_login(&self, id: i64) -> Result<()>;
}

/// Persisted refresh tokens. A token with no record here is permanently
/// invalid, whatever its signature says.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert(&self, user_id: i64, token: &str, expires_at: DateTime<Utc>) -> Result<()>;

    /// Atomically delete and return the record for `token` if it exists and
    /// is unexpired. Of two concurrent calls with the same token, exactly one
    /// gets `Some`. Must be a single atomic operation in the backing store,
    /// not a read-then-delete.
    async fn consume(&self, token: &str) -> Result<Option<StoredRefreshToken>>;

    /// Delete the record if present. Idempotent.
    async fn delete(&self, token: &str) -> Result<()>;

    /// Revoke every token belonging to a user. Returns the number deleted.
    async fn delete_for_user(&self, user_id: i64) -> Result<u64>;

    /// Sweep records already past expiry. Returns the number deleted.
    async fn delete_expired(&self) -> Result<u64>;
}
