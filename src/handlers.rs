// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact relay service.

use crate::access::AccessPolicy;
use crate::config::Config;
use crate::error::{ApiResponse, ContactError};
use crate::mailer::Mailer;
use crate::metrics::Metrics;
use crate::service::{ContactOutcome, ContactService};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, error};

/// Shared application state.
pub struct AppState {
    pub service: ContactService,
    pub access: AccessPolicy,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn Mailer>) -> prometheus::Result<Self> {
        Ok(Self {
            service: ContactService::new(mailer, config.mail.clone()),
            access: AccessPolicy::from_config(&config),
            metrics: Metrics::new()?,
            config,
        })
    }
}

/// Health check endpoint.
pub async fn health() -> Json<ApiResponse> {
    Json(ApiResponse::ok())
}

/// Accept a contact form submission.
///
/// Spam and delivered mail both answer `200 {"ok": true}`. Body read
/// failures, oversized bodies included, keep the `{"ok": false}` shape.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let outcome = match body {
        Err(rejection) => {
            debug!(status = %rejection.status(), "Request body rejected");
            ContactOutcome::Rejected(ContactError::from(rejection))
        }
        Ok(body) => match parse_body(&body) {
            Some(value) => state.service.submit(&value).await,
            None => {
                debug!(len = body.len(), "Body is not valid JSON");
                ContactOutcome::Rejected(ContactError::MalformedBody)
            }
        },
    };

    state.metrics.record_submission(outcome.label());

    match outcome {
        ContactOutcome::Sent | ContactOutcome::SpamDropped => {
            (StatusCode::OK, Json(ApiResponse::ok())).into_response()
        }
        ContactOutcome::Rejected(err) => err.into_response(),
    }
}

/// An empty body reads as `{}` so that it fails field validation rather
/// than JSON parsing.
fn parse_body(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Some(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).ok()
}

/// Prometheus exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Response for a handler that panicked.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Handler panicked");

    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::failure("Bad request")),
    )
        .into_response()
}
