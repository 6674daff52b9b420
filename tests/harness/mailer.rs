// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Stand-in email provider that records every send.

use async_trait::async_trait;
use contact_relay::{DispatchError, Mailer, OutboundMessage};
use std::sync::Mutex;

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundMessage>>,
    fail_with: Option<DispatchError>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails with `err` (still recorded).
    pub fn failing(err: DispatchError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(err),
        }
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), DispatchError> {
        self.sent.lock().unwrap().push(message.clone());
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
