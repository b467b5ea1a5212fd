use std::net::IpAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;

use crate::state::AppState;

/// Fixed-window, per-IP request limiter.
pub struct RateLimiter {
    /// Map from IP to (window_start, request_count)
    requests: DashMap<IpAddr, (Instant, u32)>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            requests: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn per_second(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(1))
    }

    /// Check if a request from this IP is allowed.
    /// Returns Ok(()) if allowed, Err(remaining_wait_time) if rate limited.
    pub fn check(&self, ip: IpAddr) -> Result<(), Duration> {
        let now = Instant::now();

        let mut entry = self.requests.entry(ip).or_insert((now, 0));
        let (window_start, count) = entry.value_mut();

        if now.duration_since(*window_start) >= self.window {
            *window_start = now;
            *count = 1;
            return Ok(());
        }

        if *count >= self.max_requests {
            return Err(self.window - now.duration_since(*window_start));
        }

        *count += 1;
        Ok(())
    }

    /// Drop entries whose window ended long ago.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.requests
            .retain(|_, (window_start, _)| now.duration_since(*window_start) < self.window * 2);
    }

    pub fn tracked_clients(&self) -> usize {
        self.requests.len()
    }
}

/// Middleware applied to write routes.
pub async fn limit_writes(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(wait_time) = state.write_limiter.check(addr.ip()) {
        tracing::debug!(ip = %addr.ip(), "Write rate limited");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", wait_time.as_secs().max(1).to_string())],
            Json(false),
        )
            .into_response();
    }
    next.run(request).await
}
