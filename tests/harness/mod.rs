// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for driving the contact relay router in-process.
//!
//! Requests go through the fully layered router with `tower::ServiceExt`;
//! the email provider is replaced by a recording [`mailer::RecordingMailer`].

#![allow(dead_code)]

pub mod generators;
pub mod mailer;
pub mod report;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use contact_relay::{config::Config, handlers::AppState, router, Mailer};
use mailer::RecordingMailer;
use serde_json::Value;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tower::ServiceExt;

pub const SITE_ORIGIN: &str = "https://site.example";
pub const FOREIGN_ORIGIN: &str = "https://evil.example";

/// Configuration used by router-level tests.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.allowed_origins = vec![SITE_ORIGIN.to_string(), "http://localhost:8888".to_string()];
    config.mail.from = "Contact Form <contact@site.example>".to_string();
    config.mail.to = "owner@site.example".to_string();
    config
}

/// Router plus handles to inspect what it did.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mailer: Arc<RecordingMailer>,
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_mailer(config, Arc::new(RecordingMailer::new()))
    }

    pub fn with_mailer(config: Config, mailer: Arc<RecordingMailer>) -> Self {
        let dyn_mailer: Arc<dyn Mailer> = mailer.clone();
        let state = Arc::new(AppState::new(config, dyn_mailer).expect("metrics registry"));
        Self {
            router: router(state.clone()),
            state,
            mailer,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// POST a JSON submission from `peer` with no `Origin` header.
    pub async fn submit(&self, body: &Value, peer: Ipv4Addr) -> TestResponse {
        self.send(contact_request(body, peer, None)).await
    }
}

/// Build a `POST /contact` request with a peer address attached.
pub fn contact_request(body: &Value, peer: Ipv4Addr, origin: Option<&str>) -> Request<Body> {
    raw_contact_request(body.to_string(), peer, origin)
}

pub fn raw_contact_request(
    body: impl Into<Body>,
    peer: Ipv4Addr,
    origin: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/contact")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(origin) = origin {
        builder = builder.header(header::ORIGIN, origin);
    }
    let mut request = builder.body(body.into()).expect("valid request");
    with_peer(&mut request, peer);
    request
}

pub fn get_request(uri: &str, origin: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(origin) = origin {
        builder = builder.header(header::ORIGIN, origin);
    }
    builder.body(Body::empty()).expect("valid request")
}

pub fn preflight_request(origin: &str, peer: Ipv4Addr) -> Request<Body> {
    let mut request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/contact")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .expect("valid request");
    with_peer(&mut request, peer);
    request
}

fn with_peer(request: &mut Request<Body>, peer: Ipv4Addr) {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((peer, 40_000))));
}
