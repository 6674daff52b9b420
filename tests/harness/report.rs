// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tallies for flood simulations.

use axum::http::StatusCode;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Default)]
pub struct FloodReport {
    statuses: HashMap<u16, usize>,
}

impl FloodReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, status: StatusCode) {
        *self.statuses.entry(status.as_u16()).or_insert(0) += 1;
    }

    pub fn count(&self, status: StatusCode) -> usize {
        self.statuses.get(&status.as_u16()).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.statuses.values().sum()
    }
}

impl fmt::Display for FloodReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<_> = self.statuses.iter().collect();
        codes.sort();
        write!(f, "total={}", self.total())?;
        for (code, count) in codes {
            write!(f, " {}={}", code, count)?;
        }
        Ok(())
    }
}
