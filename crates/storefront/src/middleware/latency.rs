//! Simulated backend latency.
//!
//! The fixture server stands in for a real backend, so API responses are
//! delayed by the configured amount. A zero delay skips the timer.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Sleep for [`AppState::latency`] before handling the request.
pub async fn latency_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let delay = state.latency();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    next.run(request).await
}
