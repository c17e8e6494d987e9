// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Poll request construction

use reqwest::Method;
use serde::Serialize;

use crate::config::{PollMode, Settings};

/// RCI endpoint for the built-in rrd query
pub(crate) const RCI_PATH: &str = "/rci/";

pub(crate) const RX_ATTRIBUTE: &str = "rxspeed";
pub(crate) const TX_ATTRIBUTE: &str = "txspeed";

/// One counter query of the rrd request
#[derive(Debug, Serialize)]
pub struct RrdQuery<'a> {
    pub name: &'a str,
    pub attribute: &'static str,
    pub detail: u8,
}

#[derive(Debug, Serialize)]
struct InterfaceQuery<'a> {
    name: &'a str,
}

/// Method, URL and optional JSON body of one poll
///
/// The body is serialized up front so field order on the wire follows the
/// query struct declarations.
#[derive(Debug, Clone)]
pub struct PollRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
}

/// rx/tx query pairs, one pair per interface, rx first
pub fn rrd_queries(interfaces: &[String]) -> Vec<RrdQuery<'_>> {
    interfaces
        .iter()
        .flat_map(|name| {
            [RX_ATTRIBUTE, TX_ATTRIBUTE].map(|attribute| RrdQuery {
                name,
                attribute,
                detail: 0,
            })
        })
        .collect()
}

fn carries_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Builds the poll request for the configured mode
///
/// # Errors
///
/// Fails only if the query cannot be serialized.
pub fn build_poll_request(settings: &Settings) -> Result<PollRequest, serde_json::Error> {
    match &settings.mode {
        PollMode::Rrd => Ok(PollRequest {
            method: Method::POST,
            url: settings.url(RCI_PATH),
            body: Some(serde_json::to_string(&rrd_queries(&settings.interfaces))?),
        }),
        PollMode::Custom(custom) => {
            let body = if carries_body(&custom.method) {
                let queries: Vec<InterfaceQuery<'_>> = settings
                    .interfaces
                    .iter()
                    .map(|name| InterfaceQuery { name })
                    .collect();
                Some(serde_json::to_string(&queries)?)
            } else {
                None
            };
            Ok(PollRequest {
                method: custom.method.clone(),
                url: settings.url(&format!("{RCI_PATH}{}", custom.command)),
                body,
            })
        }
    }
}
