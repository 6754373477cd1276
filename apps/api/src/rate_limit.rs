//! In-memory fixed-window rate limiter keyed by "ip:endpoint".
//!
//! Advisory throttling for abuse mitigation, not billing-grade accounting:
//! concurrent requests on the same key may race on the counter, and the
//! limiter fails open. A multi-instance deployment needs a shared store
//! (Redis with TTL) instead of this map.

use axum::{
    http::{header::RETRY_AFTER, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use dashmap::DashMap;
use rand::Rng;
use serde_json::json;

const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Roughly 1-in-1000 checks trigger a sweep of expired entries.
const SWEEP_PROBABILITY: f64 = 0.001;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Requests allowed per window.
    pub requests: u32,
    /// Window length in milliseconds.
    pub window_ms: i64,
}

/// Standard API endpoints: 100 requests per minute.
#[allow(dead_code)]
pub const STANDARD: RateLimitConfig = RateLimitConfig {
    requests: 100,
    window_ms: 60_000,
};

/// AI endpoints (expensive): 10 requests per minute.
pub const AI: RateLimitConfig = RateLimitConfig {
    requests: 10,
    window_ms: 60_000,
};

/// Auth endpoints (sensitive): 5 requests per minute.
#[allow(dead_code)]
pub const AUTH: RateLimitConfig = RateLimitConfig {
    requests: 5,
    window_ms: 60_000,
};

/// Email sending: 20 requests per minute.
#[allow(dead_code)]
pub const EMAIL: RateLimitConfig = RateLimitConfig {
    requests: 20,
    window_ms: 60_000,
};

#[derive(Debug)]
struct RateLimitEntry {
    count: u32,
    reset_at: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitResult {
    pub success: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Epoch milliseconds at which the current window ends.
    pub reset_at: i64,
    pub retry_after_seconds: Option<i64>,
}

/// Derives the client IP from forwarding headers.
/// Priority: first `x-forwarded-for` entry, then `x-real-ip`, then
/// `cf-connecting-ip`; falls back to loopback for local development.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return real_ip.trim().to_string();
    }

    if let Some(cf_ip) = headers.get("cf-connecting-ip").and_then(|v| v.to_str().ok()) {
        return cf_ip.trim().to_string();
    }

    "127.0.0.1".to_string()
}

/// Per-process rate limit store, shared across handlers via `AppState`.
#[derive(Default)]
pub struct RateLimiter {
    store: DashMap<String, RateLimitEntry>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks and counts one request against the `ip:endpoint` window.
    pub fn check(
        &self,
        headers: &HeaderMap,
        endpoint: &str,
        config: &RateLimitConfig,
    ) -> RateLimitResult {
        self.check_at(
            &client_ip(headers),
            endpoint,
            config,
            Utc::now().timestamp_millis(),
        )
    }

    fn check_at(
        &self,
        ip: &str,
        endpoint: &str,
        config: &RateLimitConfig,
        now: i64,
    ) -> RateLimitResult {
        self.maybe_sweep(now);

        let key = format!("{ip}:{endpoint}");

        if let Some(mut entry) = self.store.get_mut(&key) {
            if entry.reset_at >= now {
                entry.count += 1;

                if entry.count > config.requests {
                    return RateLimitResult {
                        success: false,
                        limit: config.requests,
                        remaining: 0,
                        reset_at: entry.reset_at,
                        retry_after_seconds: Some(ceil_seconds(entry.reset_at - now)),
                    };
                }

                return RateLimitResult {
                    success: true,
                    limit: config.requests,
                    remaining: config.requests - entry.count,
                    reset_at: entry.reset_at,
                    retry_after_seconds: None,
                };
            }
            // Window elapsed; fall through and start a fresh one.
        }

        let reset_at = now + config.window_ms;
        self.store.insert(key, RateLimitEntry { count: 1, reset_at });

        RateLimitResult {
            success: true,
            limit: config.requests,
            remaining: config.requests.saturating_sub(1),
            reset_at,
            retry_after_seconds: None,
        }
    }

    /// Reads the current window without counting a request (debugging).
    #[allow(dead_code)]
    pub fn status(&self, ip: &str, endpoint: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now = Utc::now().timestamp_millis();
        let key = format!("{ip}:{endpoint}");

        match self.store.get(&key) {
            Some(entry) if entry.reset_at >= now => RateLimitResult {
                success: entry.count <= config.requests,
                limit: config.requests,
                remaining: config.requests.saturating_sub(entry.count),
                reset_at: entry.reset_at,
                retry_after_seconds: (entry.count > config.requests)
                    .then(|| ceil_seconds(entry.reset_at - now)),
            },
            _ => RateLimitResult {
                success: true,
                limit: config.requests,
                remaining: config.requests,
                reset_at: now + config.window_ms,
                retry_after_seconds: None,
            },
        }
    }

    /// Drops the window for one `ip:endpoint` key (testing).
    #[allow(dead_code)]
    pub fn reset(&self, ip: &str, endpoint: &str) {
        self.store.remove(&format!("{ip}:{endpoint}"));
    }

    fn maybe_sweep(&self, now: i64) {
        if rand::thread_rng().gen::<f64>() > SWEEP_PROBABILITY {
            return;
        }
        self.sweep_expired(now);
    }

    fn sweep_expired(&self, now: i64) {
        self.store.retain(|_, entry| entry.reset_at >= now);
    }
}

fn ceil_seconds(millis: i64) -> i64 {
    (millis.max(0) + 999) / 1000
}

/// Convenience gate: returns a ready-made 429 response when the request is
/// over the limit, or `None` when it may proceed. Handlers that need quota
/// headers on success use `check` + `rate_limited_response` directly.
#[allow(dead_code)]
pub fn with_rate_limit(
    limiter: &RateLimiter,
    headers: &HeaderMap,
    endpoint: &str,
    config: &RateLimitConfig,
) -> Option<Response> {
    let result = limiter.check(headers, endpoint, config);
    if result.success {
        return None;
    }
    Some(rate_limited_response(&result))
}

/// Builds the 429 response carrying `Retry-After` and `X-RateLimit-*` headers
/// and the standard error body.
pub fn rate_limited_response(result: &RateLimitResult) -> Response {
    let retry_after = result.retry_after_seconds.unwrap_or(0);

    let body = Json(json!({
        "error": "Too many requests",
        "code": "RATE_LIMITED",
        "details": format!("Rate limit exceeded. Try again in {retry_after} seconds."),
        "retryAfter": retry_after,
        "timestamp": Utc::now().to_rfc3339(),
    }));

    let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
    let headers = response.headers_mut();
    headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(result.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(0u32));
    headers.insert(
        X_RATELIMIT_RESET,
        HeaderValue::from(ceil_seconds(result.reset_at)),
    );
    response
}

/// Adds `X-RateLimit-*` headers to a successful response.
pub fn add_rate_limit_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(result.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(result.remaining));
    headers.insert(
        X_RATELIMIT_RESET,
        HeaderValue::from(ceil_seconds(result.reset_at)),
    );
}
