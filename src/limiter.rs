// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for the contact endpoint.
//!
//! Each client key gets a counter and a window start. The first hit after a
//! window has elapsed opens a new window. Increment-and-check happens under
//! one write lock, so concurrent bursts cannot slip past the limit.
//!
//! Windows are fixed, not sliding: they open at a client's first hit. A client
//! that spends its budget just before its window closes gets a fresh budget
//! immediately after, so up to twice the limit can land within one window's
//! length across that boundary.
//!
//! Counters live behind [`RateLimitStore`] so a shared store can replace the
//! in-process [`MemoryStore`] for multi-instance deployments.

use crate::config::RateLimitConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Counter state after recording one hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    /// Hits in the current window, including this one
    pub count: u32,
    /// Time until the current window closes
    pub reset_in: Duration,
}

/// Storage for per-client window counters.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record one hit for `key` and return the updated window, atomically.
    async fn hit(&self, key: &str, window: Duration) -> WindowHit;
}

/// One client's window.
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

impl Window {
    fn expired(&self, now: Instant, window: Duration) -> bool {
        now.duration_since(self.started) >= window
    }
}

/// Process-local store holding at most `capacity` windows.
///
/// When a new client arrives at capacity, expired windows are pruned first.
/// If every window is still open, the one opened earliest is evicted.
pub struct MemoryStore {
    windows: RwLock<HashMap<String, Window>>,
    capacity: usize,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Number of tracked clients.
    pub async fn tracked(&self) -> usize {
        self.windows.read().await.len()
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn hit(&self, key: &str, window: Duration) -> WindowHit {
        let now = Instant::now();
        let mut windows = self.windows.write().await;

        if windows.len() >= self.capacity && !windows.contains_key(key) {
            let before = windows.len();
            windows.retain(|_, w| !w.expired(now, window));
            debug!(pruned = before - windows.len(), "Pruned expired rate limit windows");

            if windows.len() >= self.capacity {
                let oldest = windows
                    .iter()
                    .min_by_key(|(_, w)| w.started)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    windows.remove(&oldest);
                    debug!(
                        client = %oldest,
                        capacity = self.capacity,
                        "Rate limit store full, evicted oldest window"
                    );
                }
            }
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if entry.expired(now, window) {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        entry.count = entry.count.saturating_add(1);

        WindowHit {
            count: entry.count,
            reset_in: window.saturating_sub(now.duration_since(entry.started)),
        }
    }
}

/// Thread-safe rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Counter storage
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    /// Create a new rate limiter backed by an in-memory store.
    pub fn new(config: RateLimitConfig) -> Self {
        let store = Arc::new(MemoryStore::new(config.max_tracked_clients));
        Self::with_store(config, store)
    }

    /// Create a rate limiter over an arbitrary store.
    pub fn with_store(config: RateLimitConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self { config, store }
    }

    /// Configured requests per window.
    pub fn limit(&self) -> u32 {
        self.config.max_requests
    }

    /// Count one request from `key` and decide whether it may proceed.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        let hit = self.store.hit(key, self.config.window_duration()).await;

        if hit.count <= self.config.max_requests {
            RateLimitResult::Allowed {
                remaining: self.config.max_requests - hit.count,
                reset_in: hit.reset_in,
            }
        } else {
            debug!(client = %key, count = hit.count, retry_after = ?hit.reset_in, "Rate limit exceeded");
            RateLimitResult::Limited {
                retry_after: hit.reset_in,
            }
        }
    }
}
