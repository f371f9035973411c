//! Identity propagated from the edge gateway to internal services.
//!
//! The gateway is the only writer of the `X-User-*` headers: it strips them
//! from every inbound request and re-injects them after verifying the bearer
//! token. Internal services read them through [`Identity`] / [`MaybeIdentity`]
//! and treat them as authoritative. That trust only holds if internal
//! listeners are unreachable except through the gateway; an internal-only
//! network or mesh policy is a required deployment invariant, not something
//! this crate can enforce.

use actix_web::{dev::Payload, http::header::HeaderMap, FromRequest, HttpRequest};
use api_error::ApiError;
use futures::future::{ready, Ready};
use token_core::Role;

pub mod guard;

/// Propagated identity headers, set only by the gateway.
pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_EMAIL_HEADER: &str = "X-User-Email";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

pub const PROPAGATED_HEADERS: [&str; 3] = [USER_ID_HEADER, USER_EMAIL_HEADER, USER_ROLE_HEADER];

/// Caller identity established at the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl Identity {
    /// Parse the propagated headers. `Ok(None)` means the gateway forwarded
    /// the request unauthenticated; an error means the headers were present
    /// but unreadable, which should never happen behind a well-behaved edge.
    pub fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, ApiError> {
        let Some(raw_id) = headers.get(USER_ID_HEADER) else {
            return Ok(None);
        };

        let id = raw_id
            .to_str()
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(unauthenticated)?;

        let email = headers
            .get(USER_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(unauthenticated)?
            .to_string();

        let role = headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<Role>().ok())
            .ok_or_else(unauthenticated)?;

        Ok(Some(Identity { id, email, role }))
    }
}

fn unauthenticated() -> ApiError {
    ApiError::Unauthenticated("Authentication required".to_string())
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(match Identity::from_headers(req.headers()) {
            Ok(Some(identity)) => Ok(identity),
            Ok(None) => Err(unauthenticated()),
            Err(e) => Err(e),
        })
    }
}

/// Extractor for routes with both public and personalized behavior.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl FromRequest for MaybeIdentity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Unreadable headers degrade to anonymous rather than failing the
        // request, mirroring the optional mode at the edge.
        ready(Ok(MaybeIdentity(
            Identity::from_headers(req.headers()).ok().flatten(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn authed_request() -> HttpRequest {
        TestRequest::default()
            .insert_header((USER_ID_HEADER, "7"))
            .insert_header((USER_EMAIL_HEADER, "a@x.com"))
            .insert_header((USER_ROLE_HEADER, "teacher"))
            .to_http_request()
    }

    #[actix_rt::test]
    async fn identity_from_propagated_headers() {
        let req = authed_request();
        let identity = Identity::from_request(&req, &mut Payload::None)
            .await
            .expect("should extract identity");
        assert_eq!(identity.id, 7);
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.role, Role::Teacher);
    }

    #[actix_rt::test]
    async fn identity_missing_headers_rejected() {
        let req = TestRequest::default().to_http_request();
        let result = Identity::from_request(&req, &mut Payload::None).await;
        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }

    #[actix_rt::test]
    async fn identity_malformed_id_rejected() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-a-number"))
            .insert_header((USER_EMAIL_HEADER, "a@x.com"))
            .insert_header((USER_ROLE_HEADER, "student"))
            .to_http_request();
        let result = Identity::from_request(&req, &mut Payload::None).await;
        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }

    #[actix_rt::test]
    async fn maybe_identity_absent_is_none() {
        let req = TestRequest::default().to_http_request();
        let MaybeIdentity(identity) = MaybeIdentity::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert!(identity.is_none());
    }

    #[actix_rt::test]
    async fn maybe_identity_present_is_some() {
        let req = authed_request();
        let MaybeIdentity(identity) = MaybeIdentity::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(identity.unwrap().id, 7);
    }
}
