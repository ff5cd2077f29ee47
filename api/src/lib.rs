pub mod config;
pub mod db;
pub mod domain;
pub mod effects;
pub mod error;
pub mod store;
pub mod utilities;

use std::time::Instant;

use log::{debug, info, warn};

use crate::config::Config;
use crate::domain::{environment::Environment, request::CurrentRequest, response::Response};
use crate::error::{CourierError, Result};
use crate::utilities::{
    request::{convert_http_method, prepare_request, to_header_map},
    response::build_response,
};

pub struct CourierApi {
    pub client: reqwest::Client,
}

impl CourierApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(CourierApi { client })
    }

    /// Sends one request and normalizes the outcome. Non-2xx answers are errors.
    pub async fn make_request(
        &self,
        input: &CurrentRequest,
        environment: &Environment,
    ) -> Result<Response> {
        let prepared = prepare_request(input, environment)?;
        info!("Submitting request: {} {}", prepared.method, prepared.url);

        let headers = to_header_map(&prepared.headers)?;
        let mut req = self
            .client
            .request(convert_http_method(prepared.method), prepared.url.clone())
            .headers(headers);
        if let Some(body) = &prepared.body {
            req = req.body(body.clone());
        }

        let started = Instant::now();
        let res = req.send().await?;
        let res_status = res.status();
        let res_headers = res.headers().clone();
        let res_bytes = res.bytes().await?;
        let elapsed = started.elapsed();
        debug!(
            "{} {} answered {} in {:?} ({} bytes)",
            prepared.method,
            prepared.url,
            res_status,
            elapsed,
            res_bytes.len()
        );

        if !res_status.is_success() {
            warn!("request to {} failed with {}", prepared.url, res_status);
            return Err(CourierError::Status {
                status: res_status.as_u16(),
                reason: res_status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        Ok(build_response(
            &prepared,
            res_status,
            &res_headers,
            &res_bytes,
            elapsed,
        ))
    }
}
