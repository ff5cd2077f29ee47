use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::request::{Authorization, CurrentRequest, HttpMethod, QueryParams, RequestHeaders};
use super::response::{Response, ResponseData};

/// Number of dispatches kept before the oldest are dropped.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub url: String,
    pub method: HttpMethod,
    pub headers: RequestHeaders,
    pub params: QueryParams,
    #[serde(default)]
    pub authorization: Authorization,
    pub body: Option<String>,
    pub response: ResponseData,
    pub status: u16,
    pub timestamp: DateTime<Utc>,
}
impl HistoryItem {
    pub fn new(request: &CurrentRequest, response: &Response) -> Self {
        HistoryItem {
            id: Uuid::new_v4().to_string(),
            url: request.url.clone(),
            method: request.method,
            headers: request.headers.clone(),
            params: request.params.clone(),
            authorization: request.authorization.clone(),
            body: if request.body.trim().is_empty() {
                None
            } else {
                Some(request.body.clone())
            },
            response: response.data.clone(),
            status: response.status,
            timestamp: Utc::now(),
        }
    }
}

/// Newest-first record of past dispatches, capped at [`HISTORY_LIMIT`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    items: VecDeque<HistoryItem>,
}
impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from newest-first items, dropping anything past the cap.
    pub fn from_items(items: impl IntoIterator<Item = HistoryItem>) -> Self {
        History {
            items: items.into_iter().take(HISTORY_LIMIT).collect(),
        }
    }

    pub fn push(&mut self, item: HistoryItem) {
        self.items.push_front(item);
        self.items.truncate(HISTORY_LIMIT);
    }

    pub fn remove(&mut self, id: &str) -> Option<HistoryItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        self.items.remove(index)
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
