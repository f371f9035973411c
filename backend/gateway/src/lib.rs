//! Edge gateway.
//!
//! Single public entry point: verifies access tokens at the edge, translates
//! them into `X-User-*` identity headers, and forwards requests to the
//! internal services. Downstream services trust those headers precisely
//! because nothing client-supplied survives past the gate.

pub mod config;
pub mod middleware;
pub mod proxy;

use config::GatewayConfig;

/// Shared gateway state: one HTTP client for all upstreams.
#[derive(Clone)]
pub struct GatewayState {
    pub client: reqwest::Client,
    pub config: GatewayConfig,
}
