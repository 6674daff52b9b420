// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission flow: validate, filter spam, dispatch.
//!
//! Each call ends in exactly one [`ContactOutcome`]. `Sent` and `SpamDropped`
//! look identical to clients; the distinction only exists for logs, metrics
//! and tests.

use crate::config::MailConfig;
use crate::error::ContactError;
use crate::mailer::{send_with_timeout, Mailer, OutboundMessage};
use crate::spam::is_spam;
use crate::validator::ContactValidator;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Terminal state of one submission.
#[derive(Debug)]
pub enum ContactOutcome {
    /// The provider accepted the email
    Sent,
    /// Honeypot tripped; reported as success, nothing sent
    SpamDropped,
    /// Validation or dispatch failed
    Rejected(ContactError),
}

impl ContactOutcome {
    /// Whether the client sees success.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::SpamDropped => "spam",
            Self::Rejected(e) => e.kind(),
        }
    }
}

/// Orchestrates one submission end to end.
pub struct ContactService {
    validator: ContactValidator,
    mailer: Arc<dyn Mailer>,
    mail: MailConfig,
}

impl ContactService {
    pub fn new(mailer: Arc<dyn Mailer>, mail: MailConfig) -> Self {
        Self {
            validator: ContactValidator::new(),
            mailer,
            mail,
        }
    }

    /// Run one submission through validation, the spam filter and dispatch.
    pub async fn submit(&self, body: &Value) -> ContactOutcome {
        let submission = match self.validator.validate(body) {
            Ok(s) => s,
            Err(err) => {
                info!(error = %err, "Submission failed validation");
                return ContactOutcome::Rejected(err.into());
            }
        };

        if is_spam(&submission) {
            info!("Honeypot filled, dropping submission");
            return ContactOutcome::SpamDropped;
        }

        let message = OutboundMessage::compose(&submission, &self.mail);
        match send_with_timeout(self.mailer.as_ref(), &message, self.mail.dispatch_timeout()).await
        {
            Ok(()) => {
                info!(subject = %message.subject, "Contact message sent");
                ContactOutcome::Sent
            }
            Err(err) => {
                warn!(error = %err, "Contact message dispatch failed");
                ContactOutcome::Rejected(err.into())
            }
        }
    }
}
