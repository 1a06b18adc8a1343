//! Request guards for the ledger API
//!
//! Provides:
//! - Rate limiting per client IP
//! - Request body size limits
//! - Response security headers
//! - Request logging with IP masking

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::TrainerConfig;

#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Requests per minute per client IP
    pub rate_limit_per_minute: u32,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
    pub log_requests: bool,
    /// Mask client IPs in request logs
    pub sanitize_logs: bool,
    /// Paths exempt from rate limiting
    pub unlimited_paths: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_minute: 120,
            max_request_size: 64 * 1024,
            log_requests: false,
            sanitize_logs: true,
            unlimited_paths: vec!["/health".to_string()],
        }
    }
}

impl GuardConfig {
    pub fn from_config(config: &TrainerConfig) -> Self {
        Self {
            rate_limit_per_minute: config.security.rate_limit_per_minute,
            max_request_size: config.security.max_request_size,
            log_requests: config.logging.log_requests,
            sanitize_logs: config.logging.sanitize_logs,
            ..Self::default()
        }
    }
}

/// Fixed-window request counter per client
#[derive(Debug)]
pub struct RateLimiter {
    /// client -> (requests in window, window start)
    windows: DashMap<String, (u32, Instant)>,
    limit: u32,
    window: Duration,
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_after_secs: u64,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self::with_window(requests_per_minute, Duration::from_secs(60))
    }

    pub fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
        }
    }

    pub fn check(&self, client: &str) -> RateDecision {
        let now = Instant::now();

        let mut entry = self.windows.entry(client.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        if now.duration_since(*window_start) >= self.window {
            *count = 0;
            *window_start = now;
        }

        let reset_after_secs = self
            .window
            .checked_sub(now.duration_since(*window_start))
            .map(|d| d.as_secs())
            .unwrap_or(0);

        if *count >= self.limit {
            return RateDecision {
                allowed: false,
                remaining: 0,
                reset_after_secs,
            };
        }

        *count += 1;
        RateDecision {
            allowed: true,
            remaining: self.limit - *count,
            reset_after_secs,
        }
    }

    /// Drop windows idle for more than two periods
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, (_, window_start)| now.duration_since(*window_start) < self.window * 2);
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

#[derive(Clone)]
pub struct GuardState {
    pub config: GuardConfig,
    pub rate_limiter: Arc<RateLimiter>,
}

impl GuardState {
    pub fn new(config: GuardConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_per_minute));
        Self {
            config,
            rate_limiter,
        }
    }
}

/// Client IP, preferring proxy headers over the socket address
fn client_ip(headers: &HeaderMap, addr: Option<&SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(|ip| ip.trim().to_string())
    };

    forwarded
        .or_else(real_ip)
        .filter(|ip| !ip.is_empty())
        .or_else(|| addr.map(|a| a.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Keep the first and last four characters of an IP
pub fn mask_ip(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn is_unlimited(path: &str, unlimited: &[String]) -> bool {
    unlimited.iter().any(|p| path == p || path.starts_with(&format!("{}/", p)))
}

pub async fn rate_limit_middleware(
    State(state): State<GuardState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    if is_unlimited(request.uri().path(), &state.config.unlimited_paths) {
        return Ok(next.run(request).await);
    }

    let client = client_ip(&headers, Some(&addr));
    let decision = state.rate_limiter.check(&client);
    let limit = HeaderValue::from(state.config.rate_limit_per_minute);

    if !decision.allowed {
        warn!(
            client_ip = %mask_ip(&client),
            path = %request.uri().path(),
            "Rate limit exceeded"
        );

        let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
        let headers = response.headers_mut();
        headers.insert("X-RateLimit-Limit", limit);
        headers.insert("X-RateLimit-Remaining", HeaderValue::from(0u32));
        headers.insert("Retry-After", HeaderValue::from(decision.reset_after_secs));
        return Err(response);
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", limit);
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(decision.reset_after_secs));

    Ok(response)
}

/// Reject bodies whose declared length exceeds the limit
pub async fn body_size_middleware(
    State(state): State<GuardState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let declared = headers
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if let Some(length) = declared {
        if length > state.config.max_request_size {
            warn!(
                "Request body too large: {} bytes (max: {})",
                length, state.config.max_request_size
            );
            return Err(StatusCode::PAYLOAD_TOO_LARGE);
        }
    }

    Ok(next.run(request).await)
}

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));
    // Ledger reads must never be served stale
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
    headers.remove("Server");

    response
}

pub async fn logging_middleware(
    State(state): State<GuardState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.log_requests {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = client_ip(&headers, Some(&addr));
    let client = if state.config.sanitize_logs {
        mask_ip(&client)
    } else {
        client
    };

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        error!(method = %method, path = %path, status, duration_ms, client_ip = %client, "Request failed");
    } else if response.status().is_client_error() {
        warn!(method = %method, path = %path, status, duration_ms, client_ip = %client, "Client error");
    } else {
        info!(method = %method, path = %path, status, duration_ms, client_ip = %client, "Request completed");
    }

    response
}
