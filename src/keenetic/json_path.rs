// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Field lookup for custom polling responses
//!
//! Accepts RFC 6901 pointers (`/data/0/v`) or dotted paths (`$.data[0].v`)
//! and resolves both through [`serde_json::Value::pointer`].

use serde_json::Value;

/// Converts a path expression into a JSON pointer
///
/// Returns `None` for malformed expressions such as an unclosed bracket.
pub fn to_pointer(expr: &str) -> Option<String> {
    let expr = expr.trim();
    if expr.starts_with('/') {
        return Some(expr.to_string());
    }

    let rest = expr.strip_prefix('$').unwrap_or(expr);
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut chars = rest.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(ch) => inner.push(ch),
                        None => return None,
                    }
                }
                let inner = inner.trim();
                let unquoted = inner
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
                    .unwrap_or(inner);
                segments.push(unquoted.to_string());
            }
            ']' => return None,
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    Some(
        segments
            .iter()
            .map(|s| format!("/{}", s.replace('~', "~0").replace('/', "~1")))
            .collect(),
    )
}

/// Resolves a path expression against a JSON value
pub fn resolve<'a>(value: &'a Value, expr: &str) -> Option<&'a Value> {
    let pointer = to_pointer(expr)?;
    value.pointer(&pointer)
}

/// Reads a JSON number or numeric string as `f64`
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
