// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound mail dispatch.
//!
//! [`Mailer`] is the narrow seam between the request flow and the email
//! provider. [`ResendMailer`] talks to the Resend HTTP API and makes exactly
//! one attempt per message.

use crate::config::{ApiKey, MailConfig};
use crate::validator::Submission;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors reported by a mail dispatch attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Missing API key for the email provider")]
    MissingApiKey,

    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("Email provider did not respond in time")]
    Timeout,

    #[error("Could not reach email provider: {0}")]
    Transport(String),
}

/// A fully composed outbound email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
}

impl OutboundMessage {
    /// Build the email for a validated submission.
    pub fn compose(submission: &Submission, mail: &MailConfig) -> Self {
        let subject = submission
            .subject
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("New message from {}", submission.name));

        Self {
            from: mail.from.clone(),
            to: mail.to.clone(),
            reply_to: submission.email.clone(),
            subject,
            text: format!(
                "From: {} <{}>\n\n{}",
                submission.name, submission.email, submission.message
            ),
        }
    }
}

/// Sends one message through a transactional email provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), DispatchError>;
}

/// Resend `POST /emails` request body.
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Resend error body, e.g. `{"statusCode":401,"message":"API key is invalid","name":"validation_error"}`.
#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

/// Resend HTTP API client.
pub struct ResendMailer {
    api_url: String,
    api_key: Option<ApiKey>,
    client: reqwest::Client,
}

impl ResendMailer {
    /// Create a client from mail configuration.
    pub fn new(config: &MailConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(config.dispatch_timeout())
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.api_url)
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), DispatchError> {
        let Some(key) = self.api_key.as_ref() else {
            warn!("Dispatch attempted without an API key");
            return Err(DispatchError::MissingApiKey);
        };

        let payload = SendEmailRequest {
            from: &message.from,
            to: [&message.to],
            reply_to: &message.reply_to,
            subject: &message.subject,
            text: &message.text,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(key.expose())
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Provider accepted message");
            return Ok(());
        }

        let fallback = status
            .canonical_reason()
            .unwrap_or("Email provider error")
            .to_string();
        let message = match response.json::<ProviderError>().await {
            Ok(ProviderError { message: Some(m) }) if !m.trim().is_empty() => m,
            _ => fallback,
        };

        warn!(status = status.as_u16(), error = %message, "Provider rejected message");
        Err(DispatchError::Provider {
            status: status.as_u16(),
            message,
        })
    }
}

fn transport_error(err: reqwest::Error) -> DispatchError {
    if err.is_timeout() {
        DispatchError::Timeout
    } else {
        DispatchError::Transport(err.to_string())
    }
}

/// Convenience for callers that bound a send themselves.
pub async fn send_with_timeout(
    mailer: &dyn Mailer,
    message: &OutboundMessage,
    limit: Duration,
) -> Result<(), DispatchError> {
    match tokio::time::timeout(limit, mailer.send(message)).await {
        Ok(result) => result,
        Err(_) => Err(DispatchError::Timeout),
    }
}
