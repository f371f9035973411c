//! Token verification at the edge.
//!
//! Every gated route passes through here before proxying. The gate always
//! strips client-supplied `X-User-*` headers, whatever the mode; identity
//! headers reaching a downstream service can only have been minted by the
//! proxy from verified claims.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use api_error::ApiError;
use futures_util::future::LocalBoxFuture;
use identity_propagation::PROPAGATED_HEADERS;
use std::future::{ready, Ready};
use std::rc::Rc;
use token_core::TokenCodec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateMode {
    /// Missing or invalid token fails the request with 401.
    Required,
    /// Missing token proceeds anonymously; so does an invalid one. The
    /// downstream service sees no identity headers either way.
    Optional,
}

/// Verification gate for proxied routes.
pub struct AuthGate {
    codec: Rc<TokenCodec>,
    mode: GateMode,
}

impl AuthGate {
    pub fn required(codec: TokenCodec) -> Self {
        Self {
            codec: Rc::new(codec),
            mode: GateMode::Required,
        }
    }

    pub fn optional(codec: TokenCodec) -> Self {
        Self {
            codec: Rc::new(codec),
            mode: GateMode::Optional,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service,
            codec: self.codec.clone(),
            mode: self.mode,
        }))
    }
}

pub struct AuthGateService<S> {
    service: S,
    codec: Rc<TokenCodec>,
    mode: GateMode,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        // Spoofing guard: identity headers from the client are never trusted.
        for header in PROPAGATED_HEADERS {
            req.headers_mut().remove(header);
        }

        let token = bearer_token(&req).map(str::to_owned);

        match (self.mode, token) {
            (GateMode::Required, None) => {
                let res = req
                    .error_response(ApiError::Unauthenticated("No token provided".to_string()))
                    .map_into_right_body();
                Box::pin(ready(Ok(res)))
            }
            (GateMode::Required, Some(token)) => match self.codec.decode(&token) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    let fut = self.service.call(req);
                    Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
                }
                Err(_) => {
                    let res = req
                        .error_response(ApiError::Unauthenticated(
                            "Invalid or expired token".to_string(),
                        ))
                        .map_into_right_body();
                    Box::pin(ready(Ok(res)))
                }
            },
            (GateMode::Optional, token) => {
                if let Some(claims) = token.and_then(|t| self.codec.decode(&t).ok()) {
                    req.extensions_mut().insert(claims);
                }
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
        }
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
