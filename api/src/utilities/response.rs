use std::time::Duration;

use log::debug;
use reqwest::{header::HeaderMap, StatusCode};

use crate::domain::{
    request::RequestHeaders,
    response::{Response, ResponseData},
};
use crate::utilities::request::PreparedRequest;

/// Picks a [`ResponseData`] variant from the media type, ignoring parameters like charset.
pub fn classify_body(res_type: &str, body: &[u8]) -> ResponseData {
    let media_type = res_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let text = String::from_utf8_lossy(body).into_owned();

    if media_type == "application/json" || media_type.ends_with("+json") {
        match serde_json::from_slice(body) {
            Ok(json) => ResponseData::JSON(json),
            Err(e) => {
                debug!("response claimed json but did not parse: {}", e);
                ResponseData::TEXT(text)
            }
        }
    } else if media_type == "application/xml" || media_type == "text/xml" || media_type.ends_with("+xml") {
        ResponseData::XML(text)
    } else if media_type.starts_with("text/") {
        ResponseData::TEXT(text)
    } else {
        ResponseData::UNKNOWN(text)
    }
}

/// Repeated header names are joined with ", ".
pub fn collect_headers(res_headers: &HeaderMap) -> RequestHeaders {
    let mut headers = RequestHeaders::new();
    for name in res_headers.keys() {
        let joined = res_headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        headers.set(name.as_str(), joined);
    }
    headers
}

pub fn build_response(
    request: &PreparedRequest,
    res_status: StatusCode,
    res_headers: &HeaderMap,
    res_bytes: &[u8],
    elapsed: Duration,
) -> Response {
    let res_type = res_headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Response {
        data: classify_body(res_type, res_bytes),
        status: res_status.as_u16(),
        headers: collect_headers(res_headers),
        url: request.url.to_string(),
        method: request.method,
        response_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        response_size: res_bytes.len(),
    }
}
