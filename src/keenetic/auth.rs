// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Challenge/response authentication against the router `/auth` endpoint

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::time::Instant;

use crate::config::Settings;

pub(crate) const AUTH_PATH: &str = "/auth";
pub(crate) const CHALLENGE_HEADER: &str = "X-NDM-Challenge";
pub(crate) const REALM_HEADER: &str = "X-NDM-Realm";

/// Pause after a rejected login before trying again
pub const AUTH_COOLDOWN: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

/// JSON body of the login POST
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub login: &'a str,
    pub password: &'a str,
}

/// Computes `sha256(challenge + md5(login:realm:password))` as lowercase hex
pub fn login_digest(login: &str, password: &str, realm: &str, challenge: &str) -> String {
    let inner = md5::compute(format!("{login}:{realm}:{password}"));
    let mut hasher = Sha256::new();
    hasher.update(challenge.as_bytes());
    hasher.update(hex::encode(inner.0).as_bytes());
    hex::encode(hasher.finalize())
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Login state of one worker's HTTP session
pub struct AuthSession {
    client: Client,
    settings: Arc<Settings>,
    state: AuthState,
    last_failure: Option<Instant>,
}

impl AuthSession {
    pub fn new(client: Client, settings: Arc<Settings>) -> Self {
        Self {
            client,
            settings,
            state: AuthState::Unauthenticated,
            last_failure: None,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// True while less than [`AUTH_COOLDOWN`] has passed since the last rejected login
    pub fn is_on_cooldown(&self) -> bool {
        self.last_failure
            .is_some_and(|failed_at| failed_at.elapsed() < AUTH_COOLDOWN)
    }

    /// Forgets the current login, e.g. after the router answered 401
    pub fn invalidate(&mut self) {
        if self.state == AuthState::Authenticated {
            tracing::debug!("Session for {} expired", self.settings.router_url);
        }
        self.state = AuthState::Unauthenticated;
    }

    fn record_failure(&mut self) {
        self.state = AuthState::Unauthenticated;
        self.last_failure = Some(Instant::now());
    }

    /// Runs the challenge/response handshake
    ///
    /// Failures are logged here and reported as `false`.
    pub async fn authenticate(&mut self) -> bool {
        let url = self.settings.url(AUTH_PATH);
        tracing::trace!("Requesting challenge from {}", url);

        let (status, challenge, realm, transport_error) = match self.client.get(&url).send().await
        {
            Ok(response) => (
                Some(response.status()),
                header_value(&response, CHALLENGE_HEADER),
                header_value(&response, REALM_HEADER),
                None,
            ),
            Err(e) => (e.status(), None, None, Some(e.to_string())),
        };

        let (Some(challenge), Some(realm)) = (challenge, realm) else {
            tracing::error!(
                "Failed to obtain realm token from {}. Response code: {}, transport error: {}",
                self.settings.router_url,
                describe_status(status),
                transport_error.as_deref().unwrap_or("none")
            );
            return false;
        };

        let digest = login_digest(
            &self.settings.login,
            self.settings.password.expose_secret(),
            &realm,
            &challenge,
        );
        let body = LoginRequest {
            login: &self.settings.login,
            password: &digest,
        };

        let (status, transport_error) = match self.client.post(&url).json(&body).send().await {
            Ok(response) => (Some(response.status()), None),
            Err(e) => (e.status(), Some(e.to_string())),
        };

        if status != Some(StatusCode::OK) {
            tracing::error!(
                "Authentication failed on router {}. Response code: {}, transport error: {}",
                self.settings.router_url,
                describe_status(status),
                transport_error.as_deref().unwrap_or("none")
            );
            self.record_failure();
            return false;
        }

        tracing::debug!(
            "Authenticated on {} as {}",
            self.settings.router_url,
            self.settings.login
        );
        self.state = AuthState::Authenticated;
        true
    }

    /// Best-effort `DELETE /auth`
    pub async fn logout(&mut self) -> bool {
        let url = self.settings.url(AUTH_PATH);
        self.state = AuthState::Unauthenticated;
        match self.client.delete(&url).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::debug!("Logged out from {}", self.settings.router_url);
                true
            }
            Ok(response) => {
                tracing::debug!(
                    "Logout from {} returned {}",
                    self.settings.router_url,
                    response.status().as_u16()
                );
                false
            }
            Err(e) => {
                tracing::debug!("Logout from {} failed: {}", self.settings.router_url, e);
                false
            }
        }
    }
}

pub(crate) fn describe_status(status: Option<StatusCode>) -> String {
    status.map_or_else(|| "0".to_string(), |s| s.as_u16().to_string())
}
