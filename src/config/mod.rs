// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Configuration module for Keenetic Monitor
//!
//! Loads router sections from a `.env` file and environment variables and
//! turns a router identity into worker [`Settings`].

mod settings;


use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::error::{AppError, Result};

pub use settings::{CustomRequest, DEFAULT_DIVIDER, PollMode, ProxySettings, Settings};

/// Default configuration values
pub mod defaults {
    pub const SERVER_ADDR: &str = "0.0.0.0:9100";
    pub const ROUTER_URL: &str = "http://192.168.1.1";
    pub const LOGIN: &str = "admin";
    pub const PROXY_PORT: u16 = 8080;
    pub const INTERFACE: &str = "ISP";
    pub const METHOD: &str = "POST";
    pub const ROUTER_NAME: &str = "default";
}

/// Environment variable names used by the application
pub mod env_vars {
    pub const SERVER_ADDR: &str = "SERVER_ADDR";
    pub const ROUTERS_CONFIG: &str = "KEENETIC_ROUTERS";
    pub const URL: &str = "KEENETIC_URL";
    pub const LOGIN: &str = "KEENETIC_LOGIN";
    pub const PASSWORD: &str = "KEENETIC_PASSWORD";
    pub const PROXY: &str = "KEENETIC_PROXY";
    pub const PROXY_PORT: &str = "KEENETIC_PROXY_PORT";
    pub const INTERFACES: &str = "KEENETIC_INTERFACES";
}

/// Polling request type of a router section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Rrd,
    Custom,
}

fn default_url() -> String {
    defaults::ROUTER_URL.to_string()
}

fn default_login() -> String {
    defaults::LOGIN.to_string()
}

fn default_proxy_port() -> u16 {
    defaults::PROXY_PORT
}

fn default_interfaces() -> Vec<String> {
    vec![defaults::INTERFACE.to_string()]
}

fn default_divider() -> f64 {
    DEFAULT_DIVIDER
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new().into_boxed_str())
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| SecretString::new(s.into_boxed_str()))
}

/// Configuration section for a single router identity
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    pub name: String,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_login")]
    pub login: String,
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub password: SecretString,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default = "default_proxy_port")]
    pub proxy_port: u16,
    #[serde(default = "default_interfaces")]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub request_type: Option<RequestType>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub download_path: Option<String>,
    #[serde(default)]
    pub upload_path: Option<String>,
    #[serde(default = "default_divider")]
    pub divider: f64,
    #[serde(default)]
    pub download_divider: Option<f64>,
    #[serde(default)]
    pub upload_divider: Option<f64>,
}

impl RouterConfig {
    /// Creates a section with default values for everything but the credentials
    #[must_use]
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: default_url(),
            login: default_login(),
            password: SecretString::new(password.into().into_boxed_str()),
            proxy: None,
            proxy_port: default_proxy_port(),
            interfaces: default_interfaces(),
            request_type: None,
            command: None,
            method: None,
            download_path: None,
            upload_path: None,
            divider: default_divider(),
            download_divider: None,
            upload_divider: None,
        }
    }

    /// Validates the section and builds worker settings from it
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when a required value is missing or the
    /// polling mode is ambiguous.
    pub fn to_settings(&self) -> Result<Settings> {
        if self.name.trim().is_empty() {
            return Err(AppError::Config("Router name cannot be empty".to_string()));
        }

        if self.password.expose_secret().is_empty() {
            return Err(AppError::Config(format!(
                "No password set for router '{}'",
                self.name
            )));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "Invalid URL '{}' for router '{}': expected http:// or https://",
                self.url, self.name
            )));
        }

        let interfaces: Vec<String> = self
            .interfaces
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        if interfaces.is_empty() {
            return Err(AppError::Config(format!(
                "No interfaces configured for router '{}'",
                self.name
            )));
        }

        let download_divider = self.download_divider.unwrap_or(self.divider);
        let upload_divider = self.upload_divider.unwrap_or(self.divider);
        for divider in [download_divider, upload_divider] {
            if !divider.is_finite() || divider == 0.0 {
                return Err(AppError::Config(format!(
                    "Invalid divider {} for router '{}'",
                    divider, self.name
                )));
            }
        }

        let mut settings = Settings::new(
            self.url.clone(),
            self.login.clone(),
            self.password.expose_secret().to_string(),
            interfaces,
        )
        .with_mode(self.poll_mode()?)
        .with_dividers(download_divider, upload_divider);

        if let Some(proxy) = self.proxy.as_deref().map(str::trim)
            && !proxy.is_empty()
            && self.proxy_port > 0
        {
            settings = settings.with_proxy(proxy, self.proxy_port);
        }

        Ok(settings)
    }

    fn poll_mode(&self) -> Result<PollMode> {
        let command = self
            .command
            .as_deref()
            .map(|c| c.trim().trim_start_matches('/'))
            .filter(|c| !c.is_empty());
        let has_paths = self.download_path.is_some() || self.upload_path.is_some();

        let request_type = match (self.request_type, command) {
            (Some(t), _) => t,
            (None, Some(_)) => RequestType::Custom,
            (None, None) => RequestType::Rrd,
        };

        match request_type {
            RequestType::Rrd => {
                if command.is_some() || has_paths {
                    return Err(AppError::Config(format!(
                        "Router '{}': command and JSON paths require request_type \"custom\"",
                        self.name
                    )));
                }
                Ok(PollMode::Rrd)
            }
            RequestType::Custom => {
                let command = command.ok_or_else(|| {
                    AppError::Config(format!(
                        "Router '{}': custom request type requires a command",
                        self.name
                    ))
                })?;
                if !has_paths {
                    return Err(AppError::Config(format!(
                        "Router '{}': custom request type requires download_path or upload_path",
                        self.name
                    )));
                }
                let verb = self.method.as_deref().unwrap_or(defaults::METHOD);
                let method = Method::from_bytes(verb.trim().to_uppercase().as_bytes())
                    .map_err(|_| {
                        AppError::Config(format!(
                            "Router '{}': invalid HTTP method '{}'",
                            self.name, verb
                        ))
                    })?;
                Ok(PollMode::Custom(CustomRequest {
                    command: command.to_string(),
                    method,
                    download_path: self.download_path.clone(),
                    upload_path: self.upload_path.clone(),
                }))
            }
        }
    }
}

/// Application-wide configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub routers: Vec<RouterConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: defaults::SERVER_ADDR.to_string(),
            routers: vec![],
        }
    }
}

impl Config {
    /// Loads configuration from the `.env` file and environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let server_addr = std::env::var(env_vars::SERVER_ADDR)
            .unwrap_or_else(|_| defaults::SERVER_ADDR.to_string());

        let routers = if let Ok(config_json) = std::env::var(env_vars::ROUTERS_CONFIG) {
            serde_json::from_str(&config_json).unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to parse {}: {}. Using empty list.",
                    env_vars::ROUTERS_CONFIG,
                    e
                );
                vec![]
            })
        } else {
            vec![Self::legacy_router()]
        };

        Config {
            server_addr,
            routers,
        }
    }

    /// Single router section built from the flat `KEENETIC_*` variables
    fn legacy_router() -> RouterConfig {
        let password = std::env::var(env_vars::PASSWORD).unwrap_or_default();
        let mut router = RouterConfig::new(defaults::ROUTER_NAME, password);

        if let Ok(url) = std::env::var(env_vars::URL) {
            router.url = url;
        }
        if let Ok(login) = std::env::var(env_vars::LOGIN) {
            router.login = login;
        }
        router.proxy = std::env::var(env_vars::PROXY).ok();
        if let Some(port) = std::env::var(env_vars::PROXY_PORT)
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
        {
            router.proxy_port = port;
        }
        if let Ok(list) = std::env::var(env_vars::INTERFACES) {
            router.interfaces = parse_interface_list(&list);
        }
        router
    }

    /// Returns the configuration section for a router identity
    pub fn router(&self, identity: &str) -> Option<&RouterConfig> {
        self.routers.iter().find(|r| r.name == identity)
    }

    /// Settings factory for a router identity
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when the identity is unknown or its
    /// section is invalid.
    pub fn settings_for(&self, identity: &str) -> Result<Settings> {
        let router = self.router(identity).ok_or_else(|| {
            AppError::Config(format!("No configuration section for router '{identity}'"))
        })?;
        router.to_settings()
    }
}

/// Splits a comma-separated interface list, dropping blanks
pub fn parse_interface_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
