use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use url::{form_urlencoded, Url};

use crate::domain::{
    environment::Environment,
    request::{ApiKeyLocation, Authorization, CurrentRequest, HttpMethod, RequestHeaders},
};
use crate::error::{CourierError, Result};

pub fn convert_http_method(input: HttpMethod) -> Method {
    match input {
        HttpMethod::GET => Method::GET,
        HttpMethod::POST => Method::POST,
        HttpMethod::PUT => Method::PUT,
        HttpMethod::PATCH => Method::PATCH,
        HttpMethod::DELETE => Method::DELETE,
        HttpMethod::HEAD => Method::HEAD,
        HttpMethod::OPTIONS => Method::OPTIONS,
    }
}

/// A request with variables substituted, auth merged and the query string built.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: RequestHeaders,
    pub body: Option<String>,
}

pub fn prepare_request(current: &CurrentRequest, environment: &Environment) -> Result<PreparedRequest> {
    if current.url.trim().is_empty() {
        return Err(CourierError::UrlRequired);
    }
    let raw_url = environment.substitute(current.url.trim());

    let body = if current.method.allows_body() && !current.body.trim().is_empty() {
        Some(environment.substitute(&current.body))
    } else {
        None
    };

    let mut headers = RequestHeaders::new();
    if body.is_some() {
        headers.set("Content-Type", "application/json");
    }
    for header in &current.headers {
        let key = environment.substitute(&header.key);
        if key.trim().is_empty() {
            continue;
        }
        headers.set(key, environment.substitute(&header.value));
    }

    let mut query: Vec<(String, String)> = current
        .params
        .iter()
        .filter(|p| !p.key.trim().is_empty())
        .map(|p| (environment.substitute(&p.key), environment.substitute(&p.value)))
        .collect();

    match substitute_authorization(&current.authorization, environment) {
        Authorization::None => {}
        Authorization::Bearer { token } => {
            headers.set("Authorization", format!("Bearer {token}"));
        }
        Authorization::Basic { username, password } => {
            let encoded = STANDARD.encode(format!("{username}:{password}"));
            headers.set("Authorization", format!("Basic {encoded}"));
        }
        Authorization::ApiKey { key, value, add_to } => match add_to {
            ApiKeyLocation::Header => headers.set(key, value),
            ApiKeyLocation::Query => query.push((key, value)),
        },
    }

    let full_url = append_query(&raw_url, &query);
    let url = Url::parse(&full_url).map_err(|e| CourierError::InvalidUrl {
        url: full_url.clone(),
        reason: e.to_string(),
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CourierError::InvalidUrl {
            url: full_url,
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }

    Ok(PreparedRequest {
        method: current.method,
        url,
        headers,
        body,
    })
}

fn substitute_authorization(auth: &Authorization, environment: &Environment) -> Authorization {
    match auth {
        Authorization::None => Authorization::None,
        Authorization::Bearer { token } => Authorization::Bearer {
            token: environment.substitute(token),
        },
        Authorization::Basic { username, password } => Authorization::Basic {
            username: environment.substitute(username),
            password: environment.substitute(password),
        },
        Authorization::ApiKey { key, value, add_to } => Authorization::ApiKey {
            key: environment.substitute(key),
            value: environment.substitute(value),
            add_to: *add_to,
        },
    }
}

/// Appends encoded pairs, joining with `&` when the url already has a query and `?` otherwise.
pub fn append_query(raw_url: &str, pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return raw_url.to_string();
    }
    let (base, fragment) = match raw_url.find('#') {
        Some(index) => raw_url.split_at(index),
        None => (raw_url, ""),
    };
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();

    let mut url = String::from(base);
    if !base.contains('?') {
        url.push('?');
    } else if !base.ends_with('?') && !base.ends_with('&') {
        url.push('&');
    }
    url.push_str(&encoded);
    url.push_str(fragment);
    url
}

pub fn to_header_map(headers: &RequestHeaders) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for header in headers {
        let name = HeaderName::from_bytes(header.key.trim().as_bytes()).map_err(|_| {
            CourierError::InvalidHeader {
                name: header.key.clone(),
            }
        })?;
        let value = HeaderValue::from_str(&header.value).map_err(|_| CourierError::InvalidHeader {
            name: header.key.clone(),
        })?;
        map.insert(name, value);
    }
    Ok(map)
}
