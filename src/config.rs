// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact relay.
//!
//! Everything here is resolved once at startup from the environment and is
//! immutable afterwards.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Configuration for the contact relay service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Listen host (default: 0.0.0.0)
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// Listen port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Web origins allowed to call the API from a browser
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Outbound mail configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Provider API key; `None` makes every dispatch fail
    #[serde(default)]
    pub api_key: Option<ApiKey>,

    /// Provider base URL (default: https://api.resend.com)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Sender identity, e.g. `Contact Form <contact@example.com>`
    #[serde(default = "default_from")]
    pub from: String,

    /// Recipient address
    #[serde(default = "default_to")]
    pub to: String,

    /// Upper bound on one send in seconds (default: 10)
    #[serde(default = "default_dispatch_timeout_secs")]
    pub dispatch_timeout_secs: u64,
}

/// Fixed-window rate limiting for the contact endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per window per client (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 60)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Key on the leftmost `X-Forwarded-For` entry instead of the peer address
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// Number of tracked clients before expired windows are pruned
    #[serde(default = "default_max_tracked_clients")]
    pub max_tracked_clients: usize,
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Provider API key. Never printed in full.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length in characters, for boot diagnostics.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First three characters (e.g. `re_`), for boot diagnostics.
    pub fn prefix(&self) -> String {
        self.0.chars().take(3).collect()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({}***)", self.prefix())
    }
}

// Default value functions
fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:8888".to_string()]
}

fn default_api_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_from() -> String {
    "Contact Form <contact@example.com>".to_string()
}

fn default_to() -> String {
    "owner@example.com".to_string()
}

fn default_dispatch_timeout_secs() -> u64 {
    10
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_tracked_clients() -> usize {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            mail: MailConfig::default(),
            rate_limit: RateLimitConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            from: default_from(),
            to: default_to(),
            dispatch_timeout_secs: default_dispatch_timeout_secs(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            trust_forwarded_for: false,
            max_tracked_clients: default_max_tracked_clients(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl MailConfig {
    /// Get the dispatch timeout
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unparseable numeric or boolean values fall back to their defaults
    /// with a warning rather than aborting startup. So do zero limits,
    /// windows and timeouts.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Config {
            bind_host: get("BIND_HOST").unwrap_or(defaults.bind_host),
            port: parsed(&get, "PORT", defaults.port),
            allowed_origins: get("ALLOWED_ORIGINS")
                .map(|v| parse_origin_list(&v))
                .unwrap_or(defaults.allowed_origins),
            mail: MailConfig {
                api_key: get("RESEND_API_KEY").map(ApiKey::new),
                api_url: get("RESEND_API_URL").unwrap_or(defaults.mail.api_url),
                from: get("MAIL_FROM").unwrap_or(defaults.mail.from),
                to: get("MAIL_TO").unwrap_or(defaults.mail.to),
                dispatch_timeout_secs: parsed_nonzero(
                    &get,
                    "DISPATCH_TIMEOUT_SECS",
                    defaults.mail.dispatch_timeout_secs,
                ),
            },
            rate_limit: RateLimitConfig {
                max_requests: parsed_nonzero(
                    &get,
                    "RATE_LIMIT_MAX",
                    defaults.rate_limit.max_requests,
                ),
                window_secs: parsed_nonzero(
                    &get,
                    "RATE_LIMIT_WINDOW_SECS",
                    defaults.rate_limit.window_secs,
                ),
                trust_forwarded_for: parsed(
                    &get,
                    "TRUST_FORWARDED_FOR",
                    defaults.rate_limit.trust_forwarded_for,
                ),
                ..defaults.rate_limit
            },
            metrics: MetricsConfig {
                enabled: parsed(&get, "METRICS_ENABLED", defaults.metrics.enabled),
                ..defaults.metrics
            },
        }
    }

    /// Socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

fn parsed<T, G>(get: &G, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Unparseable configuration value, using default");
            default
        }),
        None => default,
    }
}

/// Like [`parsed`], but zero also falls back to the default.
fn parsed_nonzero<T, G>(get: &G, key: &str, default: T) -> T
where
    T: std::str::FromStr + Default + PartialEq,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => match raw.parse::<T>() {
            Ok(value) if value != T::default() => value,
            _ => {
                warn!(key, value = %raw, "Configuration value must be a positive number, using default");
                default
            }
        },
        None => default,
    }
}

/// Split a comma-separated origin list. Origins are compared verbatim against
/// the `Origin` header, so only a trailing slash is stripped.
pub fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
