// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Immutable per-worker settings

use reqwest::Method;
use secrecy::SecretString;

/// Default divider turning raw bytes/s counters into Mbit-ish units
pub const DEFAULT_DIVIDER: f64 = 1_000_000.0;

/// How the worker asks the router for traffic counters
#[derive(Debug, Clone, PartialEq)]
pub enum PollMode {
    /// Built-in RCI rrd query: one rx/tx pair per interface
    Rrd,
    /// User-declared command, verb and field paths
    Custom(CustomRequest),
}

/// Request shape for custom polling
#[derive(Debug, Clone, PartialEq)]
pub struct CustomRequest {
    /// Command path below `/rci/`, e.g. `show/interface/stat`
    pub command: String,
    pub method: Method,
    pub download_path: Option<String>,
    pub upload_path: Option<String>,
}

/// HTTP proxy used for every request of a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
}

/// Everything a polling worker needs, fixed at construction
#[derive(Debug, Clone)]
pub struct Settings {
    pub router_url: String,
    pub login: String,
    pub password: SecretString,
    pub proxy: Option<ProxySettings>,
    pub interfaces: Vec<String>,
    pub mode: PollMode,
    pub download_divider: f64,
    pub upload_divider: f64,
}

impl Settings {
    /// Creates rrd-mode settings with the default divider
    #[must_use]
    pub fn new(
        router_url: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
        interfaces: Vec<String>,
    ) -> Self {
        let router_url: String = router_url.into();
        Self {
            router_url: router_url.trim_end_matches('/').to_string(),
            login: login.into(),
            password: SecretString::new(password.into().into_boxed_str()),
            proxy: None,
            interfaces,
            mode: PollMode::Rrd,
            download_divider: DEFAULT_DIVIDER,
            upload_divider: DEFAULT_DIVIDER,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: PollMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_dividers(mut self, download: f64, upload: f64) -> Self {
        self.download_divider = download;
        self.upload_divider = upload;
        self
    }

    #[must_use]
    pub fn with_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy = Some(ProxySettings {
            host: host.into(),
            port,
        });
        self
    }

    /// Absolute URL for a path on the router, `path` starting with `/`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.router_url, path)
    }
}
