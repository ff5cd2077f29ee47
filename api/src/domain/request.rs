use std::{fmt, marker::PhantomData, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Debug, Deserialize, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    OPTIONS,
    HEAD,
}
impl HttpMethod {
    /// GET and HEAD requests never carry a body.
    pub fn allows_body(&self) -> bool {
        !matches!(self, HttpMethod::GET | HttpMethod::HEAD)
    }
}
impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::HEAD => "HEAD",
        };
        f.pad(name)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct HttpMethodParseError(pub String);
impl fmt::Display for HttpMethodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported http method {}", self.0)
    }
}
impl std::error::Error for HttpMethodParseError {}

impl FromStr for HttpMethod {
    type Err = HttpMethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "PATCH" => Ok(HttpMethod::PATCH),
            "DELETE" => Ok(HttpMethod::DELETE),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            "HEAD" => Ok(HttpMethod::HEAD),
            _ => Err(HttpMethodParseError(s.to_string())),
        }
    }
}

/// Decides whether two keys of a [`KeyValues`] list name the same entry.
pub trait KeyMatch {
    fn same_key(a: &str, b: &str) -> bool;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaseInsensitive;
impl KeyMatch for CaseInsensitive {
    fn same_key(a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaseSensitive;
impl KeyMatch for CaseSensitive {
    fn same_key(a: &str, b: &str) -> bool {
        a == b
    }
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Debug)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Ordered key/value list where writing an existing key replaces it in place.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct KeyValues<M> {
    pairs: Vec<KeyValue>,
    #[serde(skip)]
    marker: PhantomData<M>,
}

pub type RequestHeaders = KeyValues<CaseInsensitive>;
pub type QueryParams = KeyValues<CaseSensitive>;

impl<M: KeyMatch> KeyValues<M> {
    pub fn new() -> Self {
        Self {
            pairs: Vec::new(),
            marker: PhantomData,
        }
    }

    /// Last write wins: the key spelling and value are replaced, the position is kept.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|p| M::same_key(&p.key, &key)) {
            Some(existing) => {
                existing.key = key;
                existing.value = value;
            }
            None => self.pairs.push(KeyValue { key, value }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| M::same_key(&p.key, key))
            .map(|p| p.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.pairs.iter().position(|p| M::same_key(&p.key, key))?;
        Some(self.pairs.remove(index).value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyValue> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .map(|p| (p.key.clone(), p.value.clone()))
            .collect()
    }
}

impl<M> Clone for KeyValues<M> {
    fn clone(&self) -> Self {
        Self {
            pairs: self.pairs.clone(),
            marker: PhantomData,
        }
    }
}
impl<M> fmt::Debug for KeyValues<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.pairs.iter()).finish()
    }
}
impl<M> PartialEq for KeyValues<M> {
    fn eq(&self, other: &Self) -> bool {
        self.pairs == other.pairs
    }
}
impl<M> Eq for KeyValues<M> {}
impl<M: KeyMatch> Default for KeyValues<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: KeyMatch, K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValues<M> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut kv = Self::new();
        for (k, v) in iter {
            kv.set(k, v);
        }
        kv
    }
}

impl<'a, M> IntoIterator for &'a KeyValues<M> {
    type Item = &'a KeyValue;
    type IntoIter = std::slice::Iter<'a, KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}
impl FromStr for ApiKeyLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "header" => Ok(ApiKeyLocation::Header),
            "query" => Ok(ApiKeyLocation::Query),
            other => Err(format!("api key location must be header or query, got {other}")),
        }
    }
}

/// How credentials are attached to an outgoing request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Authorization {
    #[default]
    None,
    Bearer {
        token: String,
    },
    Basic {
        username: String,
        password: String,
    },
    ApiKey {
        key: String,
        value: String,
        #[serde(rename = "addTo")]
        add_to: ApiKeyLocation,
    },
}

/// The request being edited. Nothing here is persisted until it is saved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: RequestHeaders,
    pub params: QueryParams,
    pub authorization: Authorization,
    pub body: String,
}
