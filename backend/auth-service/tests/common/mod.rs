//! In-memory store implementations for exercising the service without a
//! database. `consume` mirrors the single-statement semantics of the
//! Postgres store: remove-then-check under one lock acquisition.

use async_trait::async_trait;
use auth_service::models::{Status, User};
use auth_service::services::AuthService;
use auth_service::store::{CredentialStore, RefreshTokenStore, StoredRefreshToken};
use auth_service::AppState;
use api_error::{ApiError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use token_core::{Role, TokenCodec};

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub async fn set_status(&self, id: i64, status: Status) {
        let mut users = self.users.lock().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.status = status;
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
    ) -> Result<User> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            full_name: full_name.to_string(),
            role,
            status: Status::Active,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn touch_last_login(&self, id: i64) -> Result<()> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    tokens: Mutex<HashMap<String, StoredRefreshToken>>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.lock().await.len()
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn insert(&self, user_id: i64, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let mut tokens = self.tokens.lock().await;
        tokens.insert(
            token.to_string(),
            StoredRefreshToken {
                user_id,
                token: token.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn consume(&self, token: &str) -> Result<Option<StoredRefreshToken>> {
        let mut tokens = self.tokens.lock().await;
        Ok(tokens
            .remove(token)
            .filter(|record| record.expires_at > Utc::now()))
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let mut tokens = self.tokens.lock().await;
        tokens.remove(token);
        Ok(())
    }

    async fn delete_for_user(&self, user_id: i64) -> Result<u64> {
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        tokens.retain(|_, record| record.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_expired(&self) -> Result<u64> {
        let mut tokens = self.tokens.lock().await;
        let now = Utc::now();
        let before = tokens.len();
        tokens.retain(|_, record| record.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }
}

pub const TEST_SECRET: &str = "test-secret";

pub struct TestHarness {
    pub state: AppState,
    pub users: Arc<MemoryCredentialStore>,
    pub tokens: Arc<MemoryRefreshTokenStore>,
}

pub fn harness() -> TestHarness {
    harness_with_codec(TokenCodec::new(TEST_SECRET))
}

pub fn harness_with_codec(codec: TokenCodec) -> TestHarness {
    let users = Arc::new(MemoryCredentialStore::new());
    let tokens = Arc::new(MemoryRefreshTokenStore::new());
    let state = AppState {
        auth: AuthService::new(users.clone(), tokens.clone(), codec),
    };
    TestHarness {
        state,
        users,
        tokens,
    }
}
