use std::sync::Arc;

use crate::llm_client::LlmClient;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// In-process rate-limit store. Single-instance only; a multi-instance
    /// deployment needs Redis or another shared store with TTL.
    pub rate_limiter: Arc<RateLimiter>,
}
