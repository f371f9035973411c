use crate::models::{
    AuthResponse, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest,
    TokenPairResponse,
};
use crate::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use api_error::{ApiError, Result};
use validator::Validate;

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let (user, pair) = state
        .auth
        .register(&body.email, &body.password, &body.full_name, body.role)
        .await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        user,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let (user, pair) = state.auth.login(&body.email, &body.password).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

pub async fn refresh(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    let pair = state.auth.refresh(&body.refresh_token).await?;

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

pub async fn logout(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    state.auth.logout(&body.refresh_token).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// Direct token introspection, for services that cannot sit behind the
/// gateway. Expects a bearer token in the Authorization header.
pub async fn verify(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    let token = bearer_token(&req)
        .ok_or_else(|| ApiError::Unauthenticated("No token provided".to_string()))?;

    let claims = state.auth.verify(token)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "valid": true,
        "user": {
            "id": claims.id,
            "email": claims.email,
            "role": claims.role,
        }
    })))
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
