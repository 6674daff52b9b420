// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Honeypot spam filter.
//!
//! Browsers never fill the hidden honeypot field; form-filling bots usually
//! do. A filled honeypot is answered with a normal success and never sent.

use crate::validator::Submission;

/// True when the honeypot field carries any non-empty value.
pub fn is_spam(submission: &Submission) -> bool {
    submission
        .honeypot
        .as_deref()
        .is_some_and(|value| !value.is_empty())
}
