// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators.

use serde_json::{json, Value};
use std::net::Ipv4Addr;

/// The canonical well-formed submission.
pub fn jane() -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "message": "Hello there"
    })
}

/// Generate a pool of client addresses in 10.x.x.x.
pub fn generate_ips(count: usize) -> Vec<Ipv4Addr> {
    (0..count)
        .map(|i| {
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            Ipv4Addr::new(10, a, b, c)
        })
        .collect()
}

/// Submissions that must each fail validation, labelled for assertions.
pub fn invalid_submissions() -> Vec<(&'static str, Value)> {
    vec![
        ("missing name", json!({ "email": "jane@example.com", "message": "Hello there" })),
        ("missing email", json!({ "name": "Jane Doe", "message": "Hello there" })),
        ("missing message", json!({ "name": "Jane Doe", "email": "jane@example.com" })),
        (
            "short name",
            json!({ "name": "J", "email": "jane@example.com", "message": "Hello there" }),
        ),
        (
            "short message",
            json!({ "name": "Jane Doe", "email": "jane@example.com", "message": "Hi" }),
        ),
        (
            "long subject",
            json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "subject": "x".repeat(151),
                "message": "Hello there"
            }),
        ),
        (
            "bad email",
            json!({ "name": "Jane Doe", "email": "jane-at-example", "message": "Hello there" }),
        ),
        (
            "numeric name",
            json!({ "name": 42, "email": "jane@example.com", "message": "Hello there" }),
        ),
        ("empty object", json!({})),
        ("array body", json!(["Jane Doe", "jane@example.com", "Hello there"])),
    ]
}

/// Honeypot values a form-filling bot might send.
pub fn honeypot_values() -> Vec<Value> {
    vec![
        json!("x"),
        json!(" "),
        json!("http://cheap-pills.example"),
        json!(1),
        json!(true),
        json!({ "nested": "value" }),
    ]
}

/// Attach a honeypot value to an otherwise valid submission.
pub fn with_honeypot(value: Value) -> Value {
    let mut body = jane();
    body["_gotcha"] = value;
    body
}
