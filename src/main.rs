// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay Service
//!
//! Accepts contact form submissions over HTTP and forwards them as email.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file in the
//! working directory is read first if present):
//!
//! - `RESEND_API_KEY`: provider key (missing key is logged; sends then fail)
//! - `MAIL_FROM` / `MAIL_TO`: sender identity and recipient
//! - `ALLOWED_ORIGINS`: comma-separated browser origins
//! - `BIND_HOST` / `PORT`: listen address (default: 0.0.0.0:3000)
//! - `RATE_LIMIT_MAX` / `RATE_LIMIT_WINDOW_SECS`: default 5 per 60s
//! - `TRUST_FORWARDED_FOR`: key the limiter on `X-Forwarded-For`
//! - `DISPATCH_TIMEOUT_SECS`: bound on one send (default: 10)
//! - `METRICS_ENABLED`: expose `/metrics` (default: true)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::{app::router, config::Config, handlers::AppState, mailer::ResendMailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    match &config.mail.api_key {
        Some(key) => info!(
            present = true,
            len = key.len(),
            prefix = %key.prefix(),
            "Email provider key loaded"
        ),
        None => warn!(
            present = false,
            "RESEND_API_KEY is not set; every contact submission will fail to send"
        ),
    }
    info!(
        bind_addr = %config.bind_addr(),
        allowed_origins = ?config.allowed_origins,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        "Starting contact relay"
    );

    let mailer = Arc::new(ResendMailer::new(&config.mail)?);
    let state = Arc::new(AppState::new(config.clone(), mailer)?);
    let app = router(state);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
