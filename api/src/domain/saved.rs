use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::request::{Authorization, CurrentRequest, HttpMethod, QueryParams, RequestHeaders};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRequest {
    pub id: String,
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    pub headers: RequestHeaders,
    pub params: QueryParams,
    #[serde(default)]
    pub authorization: Authorization,
    pub body: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A saved request before it has an id and timestamps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewSavedRequest {
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    pub headers: RequestHeaders,
    pub params: QueryParams,
    pub authorization: Authorization,
    pub body: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}
impl NewSavedRequest {
    pub fn from_current(name: impl Into<String>, request: &CurrentRequest) -> Self {
        NewSavedRequest {
            name: name.into(),
            url: request.url.clone(),
            method: request.method,
            headers: request.headers.clone(),
            params: request.params.clone(),
            authorization: request.authorization.clone(),
            body: if request.body.is_empty() {
                None
            } else {
                Some(request.body.clone())
            },
            description: None,
            tags: Vec::new(),
        }
    }
}

impl SavedRequest {
    pub fn create(input: NewSavedRequest) -> Self {
        let now = Utc::now();
        SavedRequest {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            url: input.url,
            method: input.method,
            headers: input.headers,
            params: input.params,
            authorization: input.authorization,
            body: input.body,
            description: input.description,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
