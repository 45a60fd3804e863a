use crate::config::Config;
use crate::services::rate_limit::{Quota, RateLimitStore, RateLimiter};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub get_limiter: RateLimiter,
    pub post_limiter: RateLimiter,
}

impl AppState {
    pub fn new(store: Arc<dyn RateLimitStore>, get_quota: Quota, post_quota: Quota) -> Self {
        Self {
            get_limiter: RateLimiter::new("GET /portfolio", get_quota, store.clone()),
            post_limiter: RateLimiter::new("POST /portfolio", post_quota, store),
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn RateLimitStore>) -> Self {
        Self::new(store, config.get_quota, config.post_quota)
    }
}
