// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Router assembly.
//!
//! Layer order, outermost first: trace, panic catcher, origin guard, CORS,
//! body limit. The rate limiter wraps `/contact` only.

use crate::access::{origin_guard, rate_limit};
use crate::handlers::{contact, health, metrics, panic_response, AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 100 * 1024;

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let contact_routes = Router::new()
        .route("/contact", post(contact))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .merge(contact_routes);

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(state.access.cors_layer())
        .layer(middleware::from_fn_with_state(state.clone(), origin_guard))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
