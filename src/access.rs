// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Access control applied before the contact handler runs.
//!
//! - Origin allow-list: requests carrying a foreign `Origin` are refused on
//!   every route; requests without one (curl, server-to-server) pass.
//! - CORS: preflights from allowed origins are answered here.
//! - Rate limiting: fixed window per client address on `/contact` only.

use crate::config::{Config, RateLimitConfig};
use crate::error::AccessError;
use crate::handlers::AppState;
use crate::limiter::{RateLimitResult, RateLimiter};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, info, warn};
use url::Url;

static RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
static FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Origin allow-list plus the contact endpoint's rate limiter.
pub struct AccessPolicy {
    origins: Vec<String>,
    origin_set: HashSet<String>,
    limiter: RateLimiter,
    trust_forwarded_for: bool,
}

impl AccessPolicy {
    pub fn new(allowed_origins: &[String], rate_limit: RateLimitConfig) -> Self {
        Self::with_limiter(
            allowed_origins,
            rate_limit.trust_forwarded_for,
            RateLimiter::new(rate_limit),
        )
    }

    /// Build a policy around an existing limiter (e.g. one over a shared store).
    pub fn with_limiter(
        allowed_origins: &[String],
        trust_forwarded_for: bool,
        limiter: RateLimiter,
    ) -> Self {
        let origins: Vec<String> = allowed_origins
            .iter()
            .filter_map(|o| normalize_origin(o))
            .collect();
        Self {
            origin_set: origins.iter().cloned().collect(),
            origins,
            limiter,
            trust_forwarded_for,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.allowed_origins, config.rate_limit.clone())
    }

    /// `None` (no header) is always admitted.
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(o) => self.origin_set.contains(o),
        }
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.origins
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// CORS layer mirroring the allow-list.
    pub fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    }

    /// Rate limit key for a request: the peer IP, or the leftmost
    /// `X-Forwarded-For` entry when running behind a trusted proxy.
    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        if self.trust_forwarded_for {
            let forwarded = headers
                .get(&FORWARDED_FOR)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(client) = forwarded {
                return client.to_string();
            }
        }
        peer.map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Reduce a configured origin to the form browsers send: lowercase scheme and
/// host, default port dropped, no path. Entries that are not http(s) origins
/// are skipped with a warning.
pub fn normalize_origin(raw: &str) -> Option<String> {
    let parsed = match Url::parse(raw.trim()) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => u,
        _ => {
            warn!(origin = %raw, "Ignoring malformed allowed origin");
            return None;
        }
    };
    Some(parsed.origin().ascii_serialization())
}

/// Refuse requests whose `Origin` header is not on the allow-list.
pub async fn origin_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .map(|v| v.to_str().unwrap_or_default().to_string());

    if !state.access.origin_allowed(origin.as_deref()) {
        let origin = origin.unwrap_or_default();
        warn!(origin = %origin, path = %request.uri().path(), "Origin not allowed");
        let err = AccessError::OriginRejected { origin };
        state.metrics.record_rejection(err.kind());
        return err.into_response();
    }

    next.run(request).await
}

/// Fixed-window limit for the contact endpoint.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let key = state
        .access
        .client_key(request.headers(), peer.map(|ConnectInfo(addr)| addr));
    let limiter = state.access.limiter();

    match limiter.check(&key).await {
        RateLimitResult::Allowed { remaining, .. } => {
            debug!(client = %key, remaining, "Request within rate limit");
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(RATE_LIMIT_LIMIT.clone(), HeaderValue::from(limiter.limit()));
            headers.insert(RATE_LIMIT_REMAINING.clone(), HeaderValue::from(remaining));
            response
        }
        RateLimitResult::Limited { retry_after } => {
            info!(
                client = %key,
                retry_after_secs = retry_after.as_secs(),
                "Request rate limited"
            );
            let err = AccessError::RateLimited { retry_after };
            state.metrics.record_rejection(err.kind());
            err.into_response()
        }
    }
}
