// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Error types for Keenetic Monitor

use thiserror::Error;

pub use crate::keenetic::ExtractError;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or IO error
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Router response could not be turned into rates
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Router API error
    #[error("Router error: {0}")]
    Router(String),

    /// Router rejected the session cookie, a new login is needed
    #[error("Router session expired")]
    Unauthorized,

    /// Metrics encoding error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Address parsing error
    #[error("Address parse error")]
    AddrParse(#[from] std::net::AddrParseError),
}

/// Convenient alias for Result with application error
pub type Result<T> = std::result::Result<T, AppError>;
