//! Auth service library
//!
//! The only component permitted to mint tokens or touch the refresh token
//! store. Everything stateful is injected through [`AppState`] at startup.

pub mod background;
pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod store;

use services::AuthService;

/// Shared application state, constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
}
