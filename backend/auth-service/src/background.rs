//! Long-running background tasks.

use crate::store::RefreshTokenStore;
use std::sync::Arc;
use std::time::Duration;

/// Periodically delete expired refresh token rows.
///
/// Expired tokens are already unusable (`consume` checks expiry), so the
/// sweep is purely about keeping the table from growing without bound.
pub fn spawn_token_sweep(
    tokens: Arc<dyn RefreshTokenStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match tokens.delete_expired().await {
                Ok(0) => {}
                Ok(swept) => tracing::info!(swept, "swept expired refresh tokens"),
                Err(err) => tracing::warn!(error = %err, "refresh token sweep failed"),
            }
        }
    })
}
