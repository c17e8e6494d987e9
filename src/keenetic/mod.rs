// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Keenetic router API client module
//!
//! Challenge/response login against `/auth`, RCI poll requests and
//! extraction of per-interface rates from the JSON responses.

mod auth;
mod client;
mod extract;
mod json_path;
mod request;
mod types;

pub use auth::{AUTH_COOLDOWN, AuthSession, AuthState, LoginRequest, login_digest};
pub(crate) use client::build_client;
pub use extract::{ExtractError, extract};
pub use json_path::{resolve as resolve_path, to_pointer};
pub use request::{PollRequest, RrdQuery, build_poll_request, rrd_queries};
pub use types::{InterfaceRates, MetricsSnapshot};
