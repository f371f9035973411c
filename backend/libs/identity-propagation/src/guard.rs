//! Role and ownership gates run inside each internal service after the edge
//! has established identity.
//!
//! Both checks are pure functions over (identity, resource, rule). The rule
//! text is returned verbatim in the `Forbidden` error and becomes the
//! user-visible message.

use crate::Identity;
use api_error::ApiError;
use token_core::Role;

/// Permit the operation only if the caller's role is in `allowed`.
pub fn require_role(identity: &Identity, allowed: &[Role], rule: &str) -> Result<(), ApiError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(rule.to_string()))
    }
}

/// Permit the operation only if the caller owns the resource or is an admin.
pub fn require_owner(identity: &Identity, owner_id: i64, rule: &str) -> Result<(), ApiError> {
    if identity.id == owner_id || identity.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden(rule.to_string()))
    }
}
