use std::{
    fmt,
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::error::AppError;

/// Allowed number of hits per fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub limit: u32,
    pub window: Duration,
}

impl Quota {
    pub const fn per_minute(limit: u32) -> Self {
        Self {
            limit,
            window: Duration::from_secs(60),
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}s", self.limit, self.window.as_secs())
    }
}

/// Parses `"5/minute"` or `"5 per minute"`.
impl FromStr for Quota {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (count, unit) = s
            .split_once('/')
            .or_else(|| s.split_once(" per "))
            .ok_or_else(|| anyhow::anyhow!("Invalid quota '{}', expected e.g. 5/minute", s))?;

        let limit: u32 = count
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid quota count in '{}'", s))?;
        if limit == 0 {
            anyhow::bail!("Quota limit must be greater than 0");
        }

        let secs = match unit.trim().to_ascii_lowercase().as_str() {
            "second" | "seconds" => 1,
            "minute" | "minutes" => 60,
            "hour" | "hours" => 60 * 60,
            "day" | "days" => 24 * 60 * 60,
            other => anyhow::bail!("Invalid quota unit '{}'", other),
        };

        Ok(Quota {
            limit,
            window: Duration::from_secs(secs),
        })
    }
}

/// Outcome of recording one hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    /// Hits in the current window, this one included.
    pub count: u32,
    pub resets_at: Instant,
}

/// Counter store keyed by client identifier with explicit expiry.
///
/// `hit` must increment and report atomically per key.
pub trait RateLimitStore: Send + Sync {
    fn hit(&self, key: &str, window: Duration, now: Instant) -> WindowHit;

    /// Drops every window that expired before `now`, returning how many were removed.
    fn purge_expired(&self, now: Instant) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    resets_at: Instant,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    windows: DashMap<String, Window>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryStore {
    fn hit(&self, key: &str, window: Duration, now: Instant) -> WindowHit {
        // The entry guard holds the shard lock until the end of this scope.
        let mut entry = self.windows.entry(key.to_owned()).or_insert(Window {
            count: 0,
            resets_at: now + window,
        });

        if now >= entry.resets_at {
            entry.count = 0;
            entry.resets_at = now + window;
        }
        entry.count = entry.count.saturating_add(1);

        WindowHit {
            count: entry.count,
            resets_at: entry.resets_at,
        }
    }

    fn purge_expired(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, w| now < w.resets_at);
        before.saturating_sub(self.windows.len())
    }

    fn len(&self) -> usize {
        self.windows.len()
    }
}

/// Fixed-window limiter for one route. Limiters sharing a store are kept apart by `scope`.
#[derive(Clone)]
pub struct RateLimiter {
    scope: &'static str,
    quota: Quota,
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    pub fn new(scope: &'static str, quota: Quota, store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            scope,
            quota,
            store,
        }
    }

    pub fn quota(&self) -> Quota {
        self.quota
    }

    pub fn check(&self, client: &str) -> Result<(), AppError> {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: &str, now: Instant) -> Result<(), AppError> {
        let key = format!("{}:{}", self.scope, client);
        let hit = self.store.hit(&key, self.quota.window, now);

        if hit.count > self.quota.limit {
            debug!(scope = self.scope, "Rate limit exceeded ({})", self.quota);
            return Err(AppError::RateLimited {
                retry_after: hit.resets_at.saturating_duration_since(now),
            });
        }

        Ok(())
    }
}

/// Periodically drops expired windows so the store does not grow with every client seen.
pub fn spawn_sweeper(
    store: Arc<dyn RateLimitStore>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let removed = store.purge_expired(Instant::now());
            if removed > 0 {
                debug!("Purged {} expired rate limit windows", removed);
            }
            if store.len() > 100_000 {
                warn!("⚠️ Rate limit store is tracking {} clients", store.len());
            }
        }
    })
}
