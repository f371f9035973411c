use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use api_error::Result;
use gateway::config::GatewayConfig;
use gateway::middleware::AuthGate;
use gateway::{proxy, GatewayState};
use std::time::Duration;
use token_core::TokenCodec;
use tracing_actix_web::TracingLogger;

async fn to_auth(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<GatewayState>,
) -> Result<HttpResponse> {
    proxy::forward(&req, body, &state.client, &state.config.auth_service_url).await
}

async fn to_users(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<GatewayState>,
) -> Result<HttpResponse> {
    proxy::forward(&req, body, &state.client, &state.config.user_service_url).await
}

async fn to_courses(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<GatewayState>,
) -> Result<HttpResponse> {
    proxy::forward(&req, body, &state.client, &state.config.course_service_url).await
}

async fn to_enrollments(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<GatewayState>,
) -> Result<HttpResponse> {
    proxy::forward(
        &req,
        body,
        &state.client,
        &state.config.enrollment_service_url,
    )
    .await
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "NOT_FOUND",
        "message": "Route not found",
    }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = GatewayConfig::from_env()?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let state = GatewayState {
        client,
        config: config.clone(),
    };
    let secret = config.jwt_secret.clone();

    let addr = (config.host.clone(), config.port);
    tracing::info!(host = %config.host, port = config.port, "gateway listening");

    HttpServer::new(move || {
        let codec = TokenCodec::new(secret.clone());

        // Public catalog routes take the optional gate so an authenticated
        // browser still reaches the course service with its identity.
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .service(web::scope("/api/auth").default_service(web::to(to_auth)))
            .service(
                web::scope("/api/users")
                    .wrap(AuthGate::required(codec.clone()))
                    .default_service(web::to(to_users)),
            )
            .service(
                web::scope("/api/enrollments")
                    .wrap(AuthGate::required(codec.clone()))
                    .default_service(web::to(to_enrollments)),
            )
            .service(
                web::scope("/api/courses")
                    .wrap(AuthGate::optional(codec.clone()))
                    .default_service(web::to(to_courses)),
            )
            .service(
                web::scope("/api/sections")
                    .wrap(AuthGate::optional(codec.clone()))
                    .default_service(web::to(to_courses)),
            )
            .service(
                web::scope("/api/lessons")
                    .wrap(AuthGate::optional(codec.clone()))
                    .default_service(web::to(to_courses)),
            )
            .service(
                web::scope("/api/reviews")
                    .wrap(AuthGate::optional(codec.clone()))
                    .default_service(web::to(to_courses)),
            )
            .service(
                web::scope("/api/categories")
                    .wrap(AuthGate::optional(codec))
                    .default_service(web::to(to_courses)),
            )
            .route("/health", web::get().to(health))
            .default_service(web::to(not_found))
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
