use crate::models::{PublicUser, Status, User};
use crate::security::password;
use crate::store::{CredentialStore, RefreshTokenStore};
use api_error::{ApiError, Result};
use chrono::Utc;
use std::sync::Arc;
use token_core::{Claims, Role, TokenCodec, TokenError};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";
const INVALID_TOKEN: &str = "Invalid or expired token";

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Credential verification and token issuance.
///
/// Stateless per request; the refresh token store is the only shared mutable
/// resource, and every rotation goes through its atomic `consume`.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        codec: TokenCodec,
    ) -> Self {
        Self {
            users,
            tokens,
            codec,
        }
    }

    /// Create a user and issue its first token pair.
    ///
    /// Only student and teacher accounts can self-register.
    pub async fn register(
        &self,
        email: &str,
        plaintext: &str,
        full_name: &str,
        role: Option<Role>,
    ) -> Result<(PublicUser, TokenPair)> {
        let role = match role {
            None => Role::Student,
            Some(Role::Admin) => {
                return Err(ApiError::Validation(
                    "role must be student or teacher".to_string(),
                ))
            }
            Some(role) => role,
        };

        if self.users.find_by_email(email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = password::hash_password(plaintext)?;
        let user = self
            .users
            .create(email, &password_hash, full_name, role)
            .await?;

        let pair = self.issue_pair(&user).await?;

        tracing::info!(user_id = user.id, "user registered");
        Ok((PublicUser::from(user), pair))
    }

    /// Verify credentials and issue a fresh token pair.
    ///
    /// Unknown email, inactive account, and wrong password all collapse to
    /// the same opaque error so a caller cannot probe which check failed.
    pub async fn login(&self, email: &str, plaintext: &str) -> Result<(PublicUser, TokenPair)> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        };

        if user.status != Status::Active {
            tracing::debug!(user_id = user.id, "login rejected: account inactive");
            return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        if !password::verify_password(plaintext, &user.password_hash)? {
            return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        self.users.touch_last_login(user.id).await?;

        let pair = self.issue_pair(&user).await?;

        tracing::info!(user_id = user.id, "user logged in");
        Ok((PublicUser::from(user), pair))
    }

    /// Rotate a refresh token: consume the presented one, issue a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        // Signature and embedded expiry first, so a forged token can never
        // consume a legitimate record.
        let claims = self
            .codec
            .decode(refresh_token)
            .map_err(|_| ApiError::Unauthenticated(INVALID_REFRESH_TOKEN.to_string()))?;

        // Atomic delete-returning. Of two concurrent refreshes presenting the
        // same token, exactly one observes the record; the other fails here.
        let Some(record) = self.tokens.consume(refresh_token).await? else {
            return Err(ApiError::Unauthenticated(INVALID_REFRESH_TOKEN.to_string()));
        };

        if claims.id != record.user_id {
            return Err(ApiError::Unauthenticated(INVALID_REFRESH_TOKEN.to_string()));
        }

        let Some(user) = self.users.find_by_id(record.user_id).await? else {
            return Err(ApiError::Unauthenticated(INVALID_REFRESH_TOKEN.to_string()));
        };

        // Claims for the new pair come from the current user row, so a role
        // or status change takes effect from this rotation onward.
        let pair = self.issue_pair(&user).await?;

        tracing::info!(user_id = user.id, "refresh token rotated");
        Ok(pair)
    }

    /// Revoke a refresh token. Absence of a record is not an error.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        self.tokens.delete(refresh_token).await?;
        Ok(())
    }

    /// Validate an access token and return its claims. Pure; no store lookup.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        self.codec
            .decode(token)
            .map_err(|_| ApiError::Unauthenticated(INVALID_TOKEN.to_string()))
    }

    async fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        let access_token = self
            .codec
            .issue_access(user.id, &user.email, user.role)
            .map_err(signing_error)?;
        let refresh_token = self
            .codec
            .issue_refresh(user.id, &user.email, user.role)
            .map_err(signing_error)?;

        let expires_at = Utc::now() + self.codec.refresh_ttl();
        self.tokens
            .insert(user.id, &refresh_token, expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

fn signing_error(err: TokenError) -> ApiError {
    ApiError::Internal(format!("Failed to sign token: {}", err))
}
