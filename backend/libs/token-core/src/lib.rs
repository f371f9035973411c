//! Shared token construction and verification.
//!
//! Every service that mints or checks a token goes through [`TokenCodec`].
//! The codec is plain data built at startup from the process-wide signing
//! secret; there is no global key state. Verification is pure: no I/O, no
//! persistence lookup. Revocation of refresh tokens is the token store's
//! concern, not the codec's.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Default access token lifetime: 1 hour.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 3600;
/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 3600;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// User role as carried in token claims and propagated identity headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ParseRoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Claims embedded in both access and refresh tokens.
///
/// Claims are re-derived from the user row at issuance time, so a role or
/// status change takes effect on the next login/refresh even though an
/// outstanding access token still carries the old snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique per token, so two tokens minted for the same user in the same
    /// second are still distinct strings.
    pub jti: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed token, bad signature, or expired. One variant on purpose:
    /// callers must not be able to tell which check failed.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Failed to sign token")]
    Signing,
}

/// HS256 signer/verifier over the shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_ttls(
            secret,
            Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
        )
    }

    pub fn with_ttls(secret: impl Into<String>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Mint a short-lived access token.
    pub fn issue_access(&self, id: i64, email: &str, role: Role) -> Result<String, TokenError> {
        self.issue(id, email, role, self.access_ttl)
    }

    /// Mint a long-lived refresh token. The caller is responsible for
    /// persisting the returned value; an unpersisted refresh token is
    /// permanently invalid.
    pub fn issue_refresh(&self, id: i64, email: &str, role: Role) -> Result<String, TokenError> {
        self.issue(id, email, role, self.refresh_ttl)
    }

    fn issue(&self, id: i64, email: &str, role: Role, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            id,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|_| TokenError::Signing)
    }

    /// Validate signature and expiry and return the decoded claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(JWT_ALGORITHM);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| TokenError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret")
    }

    #[test]
    fn access_token_roundtrip() {
        let token = codec()
            .issue_access(42, "test@example.com", Role::Student)
            .expect("should issue token");
        assert_eq!(token.matches('.').count(), 2);

        let claims = codec().decode(&token).expect("should decode");
        assert_eq!(claims.id, 42);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, Role::Student);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_outlives_access_token() {
        let c = codec();
        let access = c.issue_access(1, "a@x.com", Role::Teacher).unwrap();
        let refresh = c.issue_refresh(1, "a@x.com", Role::Teacher).unwrap();

        let access_claims = c.decode(&access).unwrap();
        let refresh_claims = c.decode(&refresh).unwrap();
        assert!(refresh_claims.exp > access_claims.exp);
    }

    #[test]
    fn tokens_minted_together_are_distinct() {
        let c = codec();
        let a = c.issue_refresh(1, "a@x.com", Role::Student).unwrap();
        let b = c.issue_refresh(1, "a@x.com", Role::Student).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tampered_token_rejected() {
        let token = codec().issue_access(1, "a@x.com", Role::Student).unwrap();
        let tampered = format!("{}x", token);
        assert_eq!(codec().decode(&tampered), Err(TokenError::InvalidToken));
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = codec().issue_access(1, "a@x.com", Role::Student).unwrap();
        let other = TokenCodec::new("other-secret");
        assert_eq!(other.decode(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn expired_token_rejected() {
        let expired = TokenCodec::with_ttls(
            "test-secret",
            Duration::seconds(-3600),
            Duration::seconds(-3600),
        );
        let token = expired.issue_access(1, "a@x.com", Role::Student).unwrap();
        assert_eq!(codec().decode(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn expired_and_malformed_are_indistinguishable() {
        let expired = TokenCodec::with_ttls(
            "test-secret",
            Duration::seconds(-3600),
            Duration::seconds(-3600),
        )
        .issue_access(1, "a@x.com", Role::Student)
        .unwrap();

        assert_eq!(codec().decode(&expired), codec().decode("not.a.token"));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");
        assert_eq!(serde_json::to_value(Role::Teacher).unwrap(), "teacher");
        assert_eq!(serde_json::to_value(Role::Student).unwrap(), "student");
    }

    #[test]
    fn role_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert!("superuser".parse::<Role>().is_err());
    }
}
