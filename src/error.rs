// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the contact relay.
//!
//! Business errors (`ContactError`) become `400 {"ok": false}` responses.
//! Transport-layer rejections (`AccessError`) are produced by middleware and
//! never reach the contact handler.

use crate::mailer::DispatchError;
use crate::validator::ValidationError;
use axum::{
    extract::rejection::BytesRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Uniform response body for every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
        }
    }
}

/// Errors raised while handling a single submission.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Invalid JSON body")]
    MalformedBody,

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Failed to read request body")]
    UnreadableBody,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ContactError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedBody
            | Self::BodyTooLarge
            | Self::UnreadableBody
            | Self::Validation(_) => "invalid",
            Self::Dispatch(_) => "dispatch_failed",
        }
    }
}

impl ContactError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<BytesRejection> for ContactError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::BodyTooLarge
        } else {
            Self::UnreadableBody
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        (self.status(), Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

/// Rejections issued by the access control layer.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Origin not allowed")]
    OriginRejected { origin: String },

    #[error("Too many requests, please try again later.")]
    RateLimited { retry_after: Duration },
}

impl AccessError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OriginRejected { .. } => "origin",
            Self::RateLimited { .. } => "rate_limited",
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::failure(self.to_string()));
        match self {
            Self::OriginRejected { .. } => (StatusCode::FORBIDDEN, body).into_response(),
            Self::RateLimited { retry_after } => {
                // Round up so clients never retry inside the window
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, secs.max(1).to_string())],
                    body,
                )
                    .into_response()
            }
        }
    }
}
