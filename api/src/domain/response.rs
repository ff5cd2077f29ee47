use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::request::{HttpMethod, RequestHeaders};
use crate::error::CourierError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ResponseData {
    JSON(Value),
    XML(String),
    TEXT(String),
    UNKNOWN(String),
}
impl ResponseData {
    /// Body as display text, JSON pretty printed.
    pub fn to_display_string(&self) -> String {
        match self {
            ResponseData::JSON(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ResponseData::XML(text) | ResponseData::TEXT(text) | ResponseData::UNKNOWN(text) => {
                text.clone()
            }
        }
    }
}

/// Normalized result of a successful dispatch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub data: ResponseData,
    pub status: u16,
    pub headers: RequestHeaders,
    pub url: String,
    pub method: HttpMethod,
    pub response_time_ms: u64,
    pub response_size: usize,
}
impl Response {
    pub fn status_class(&self) -> StatusClass {
        StatusClass::from(self.status)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestError {
    pub message: String,
    pub status: u16,
}
impl From<&CourierError> for RequestError {
    fn from(err: &CourierError) -> Self {
        RequestError {
            message: err.to_string(),
            status: err.status(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
}
impl From<u16> for StatusClass {
    fn from(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirection,
            400..=499 => StatusClass::ClientError,
            500..=u16::MAX => StatusClass::ServerError,
            _ => StatusClass::Informational,
        }
    }
}
