use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{environment::EnvironmentVariable, history::HistoryItem, saved::SavedRequest};

/// Everything a user can carry between installs: saved requests, history and variables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub requests: Vec<SavedRequest>,
    pub history: Vec<HistoryItem>,
    pub environment_variables: Vec<EnvironmentVariable>,
    pub export_date: DateTime<Utc>,
}
