// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay
//!
//! Backend for a website contact form. One submission per request:
//!
//! - Origin allow-list and CORS for browser callers
//! - Per-client fixed-window rate limiting (5 per 60s default)
//! - Schema validation of the submitted fields
//! - Honeypot spam trap answered with a normal success
//! - Single email dispatch through the Resend API, no retries

pub mod access;
pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod service;
pub mod spam;
pub mod validator;

pub use access::AccessPolicy;
pub use app::router;
pub use config::Config;
pub use error::{AccessError, ApiResponse, ContactError};
pub use handlers::AppState;
pub use limiter::{MemoryStore, RateLimitResult, RateLimitStore, RateLimiter};
pub use mailer::{DispatchError, Mailer, OutboundMessage, ResendMailer};
pub use service::{ContactOutcome, ContactService};
pub use validator::{ContactValidator, Submission, ValidationError};
