use actix_web::{web, App, HttpServer};
use auth_service::background::spawn_token_sweep;
use auth_service::config::Config;
use auth_service::db::{PgCredentialStore, PgRefreshTokenStore};
use auth_service::services::AuthService;
use auth_service::store::{CredentialStore, RefreshTokenStore};
use auth_service::{routes, AppState};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use token_core::TokenCodec;
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let codec = TokenCodec::with_ttls(
        config.jwt_secret.clone(),
        chrono::Duration::seconds(config.access_token_ttl_secs),
        chrono::Duration::seconds(config.refresh_token_ttl_secs),
    );

    let users: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool.clone()));
    let tokens: Arc<dyn RefreshTokenStore> = Arc::new(PgRefreshTokenStore::new(pool));

    spawn_token_sweep(
        tokens.clone(),
        Duration::from_secs(config.token_sweep_interval_secs),
    );

    let state = AppState {
        auth: AuthService::new(users, tokens, codec),
    };

    let addr = (config.host.clone(), config.port);
    tracing::info!(host = %config.host, port = config.port, "auth service listening");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
