// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Turns router responses into per-interface rates

use serde_json::Value;
use thiserror::Error;

use super::json_path::{as_number, resolve};
use super::request::{RX_ATTRIBUTE, TX_ATTRIBUTE};
use super::types::{InterfaceRates, MetricsSnapshot};
use crate::config::{CustomRequest, PollMode, Settings};

/// Whole-response failures; per-interface problems only drop that interface
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected a JSON array, got {0}")]
    UnexpectedShape(String),
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parses a poll response body into a snapshot
///
/// # Errors
///
/// Returns [`ExtractError`] if the body is not JSON or not a top-level array.
pub fn extract(body: &[u8], settings: &Settings) -> Result<MetricsSnapshot, ExtractError> {
    let value: Value = serde_json::from_slice(body)?;
    let Value::Array(items) = value else {
        return Err(ExtractError::UnexpectedShape(json_kind(&value).to_string()));
    };

    Ok(match &settings.mode {
        PollMode::Rrd => extract_rrd(&items, settings),
        PollMode::Custom(custom) => extract_custom(&items, custom, settings),
    })
}

fn extract_rrd(items: &[Value], settings: &Settings) -> MetricsSnapshot {
    let mut snapshot = MetricsSnapshot::new();
    for (i, name) in settings.interfaces.iter().enumerate() {
        let download = items
            .get(2 * i)
            .and_then(|r| rrd_value(r, name, RX_ATTRIBUTE, settings.download_divider));
        let upload = items
            .get(2 * i + 1)
            .and_then(|r| rrd_value(r, name, TX_ATTRIBUTE, settings.upload_divider));

        match (download, upload) {
            (Some(download), Some(upload)) => {
                snapshot.insert(name.clone(), InterfaceRates::new(download, upload));
            }
            _ => tracing::debug!("No rrd data for interface {}", name),
        }
    }
    snapshot
}

fn rrd_value(record: &Value, interface: &str, attribute: &str, divider: f64) -> Option<f64> {
    if let Some(status) = record
        .get("status")
        .and_then(Value::as_array)
        .and_then(|s| s.first())
        && status.get("status").and_then(Value::as_str) == Some("error")
    {
        let message = status
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message");
        tracing::warn!(
            "Router reported an error for {} {}: {}",
            interface,
            attribute,
            message
        );
    }

    let first = record.get("data")?.as_array()?.first()?;
    as_number(first.get("v")?).map(|v| v / divider)
}

fn extract_custom(items: &[Value], custom: &CustomRequest, settings: &Settings) -> MetricsSnapshot {
    let mut snapshot = MetricsSnapshot::new();
    for (i, name) in settings.interfaces.iter().enumerate() {
        let Some(element) = items.get(i) else {
            tracing::debug!("No response element for interface {}", name);
            continue;
        };

        let download = custom_value(element, custom.download_path.as_deref(), settings.download_divider);
        let upload = custom_value(element, custom.upload_path.as_deref(), settings.upload_divider);

        match (download, upload) {
            (Some(download), Some(upload)) => {
                snapshot.insert(name.clone(), InterfaceRates::new(download, upload));
            }
            _ => tracing::debug!("Configured field missing for interface {}", name),
        }
    }
    snapshot
}

/// Unconfigured paths read as zero; configured but unresolvable ones as `None`
fn custom_value(element: &Value, path: Option<&str>, divider: f64) -> Option<f64> {
    match path {
        None => Some(0.0),
        Some(path) => resolve(element, path)
            .and_then(as_number)
            .map(|v| v / divider),
    }
}
