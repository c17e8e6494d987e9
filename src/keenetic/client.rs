// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! HTTP session setup for a single worker

use std::time::Duration;

use reqwest::{Client, Proxy};

use crate::config::Settings;
use crate::error::{AppError, Result};

/// Connection timeout (5 seconds)
pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Whole-request timeout, bounds how long `stop()` can wait on the network
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the HTTP session a worker keeps for its whole life
///
/// The cookie store keeps the router session between `/auth` and `/rci/`.
///
/// # Errors
///
/// Returns [`AppError::Config`] if the proxy cannot be used, or
/// [`AppError::Http`] if the client cannot be built.
pub(crate) fn build_client(settings: &Settings) -> Result<Client> {
    let mut builder = Client::builder()
        .cookie_store(true)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT);

    if let Some(proxy) = &settings.proxy {
        let proxy_url = format!("http://{}:{}", proxy.host, proxy.port);
        tracing::debug!("Using HTTP proxy {}", proxy_url);
        let proxy = Proxy::all(&proxy_url)
            .map_err(|e| AppError::Config(format!("Invalid proxy '{proxy_url}': {e}")))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_without_proxy() {
        let settings = Settings::new("http://192.168.1.1", "admin", "pw", vec!["ISP".into()]);
        assert!(build_client(&settings).is_ok());
    }

    #[test]
    fn test_build_client_with_proxy() {
        let settings = Settings::new("http://192.168.1.1", "admin", "pw", vec!["ISP".into()])
            .with_proxy("proxy.local", 3128);
        assert!(build_client(&settings).is_ok());
    }

    #[test]
    fn test_timeouts() {
        assert_eq!(CONNECT_TIMEOUT, Duration::from_secs(5));
        assert!(REQUEST_TIMEOUT > CONNECT_TIMEOUT);
    }
}
