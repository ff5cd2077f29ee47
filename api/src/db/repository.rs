use std::str::FromStr;

use anyhow::Context;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::{
  sqlite::{SqliteConnectOptions, SqliteRow},
  Connection, Row, SqliteConnection,
};

use crate::domain::{
  environment::EnvironmentVariable,
  history::HistoryItem,
  request::HttpMethod,
  saved::SavedRequest,
};

const SCHEMA: [&str; 3] = [
  r#"
  CREATE TABLE IF NOT EXISTS history (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    url TEXT NOT NULL,
    method TEXT NOT NULL,
    headers TEXT NOT NULL,
    params TEXT NOT NULL,
    authorization TEXT NOT NULL,
    body TEXT,
    response TEXT NOT NULL,
    status INTEGER NOT NULL,
    timestamp TEXT NOT NULL
  )
  "#,
  r#"
  CREATE TABLE IF NOT EXISTS saved_request (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    method TEXT NOT NULL,
    headers TEXT NOT NULL,
    params TEXT NOT NULL,
    authorization TEXT NOT NULL,
    body TEXT,
    description TEXT,
    tags TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
  )
  "#,
  r#"
  CREATE TABLE IF NOT EXISTS environment_variable (
    position INTEGER PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    value TEXT NOT NULL,
    enabled INTEGER NOT NULL
  )
  "#,
];

pub async fn initialize_db(database_url: &str) -> anyhow::Result<SqliteConnection> {
  info!("acquiring sqlite connection to {}", database_url);
  let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
  let mut connection = SqliteConnection::connect_with(&options)
    .await
    .with_context(|| format!("could not open database {database_url}"))?;
  for statement in SCHEMA {
    sqlx::query(statement).execute(&mut connection).await?;
  }
  debug!("sqlite schema ready");
  Ok(connection)
}

fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
  Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

fn parse_method(raw: &str) -> anyhow::Result<HttpMethod> {
  Ok(HttpMethod::from_str(raw)?)
}

fn history_from_row(row: &SqliteRow) -> anyhow::Result<HistoryItem> {
  let status: i64 = row.try_get("status")?;
  Ok(HistoryItem {
    id: row.try_get("id")?,
    url: row.try_get("url")?,
    method: parse_method(row.try_get("method")?)?,
    headers: serde_json::from_str(row.try_get("headers")?)?,
    params: serde_json::from_str(row.try_get("params")?)?,
    authorization: serde_json::from_str(row.try_get("authorization")?)?,
    body: row.try_get("body")?,
    response: serde_json::from_str(row.try_get("response")?)?,
    status: u16::try_from(status)?,
    timestamp: parse_timestamp(row.try_get("timestamp")?)?,
  })
}

fn saved_from_row(row: &SqliteRow) -> anyhow::Result<SavedRequest> {
  Ok(SavedRequest {
    id: row.try_get("id")?,
    name: row.try_get("name")?,
    url: row.try_get("url")?,
    method: parse_method(row.try_get("method")?)?,
    headers: serde_json::from_str(row.try_get("headers")?)?,
    params: serde_json::from_str(row.try_get("params")?)?,
    authorization: serde_json::from_str(row.try_get("authorization")?)?,
    body: row.try_get("body")?,
    description: row.try_get("description")?,
    tags: serde_json::from_str(row.try_get("tags")?)?,
    created_at: parse_timestamp(row.try_get("created_at")?)?,
    updated_at: parse_timestamp(row.try_get("updated_at")?)?,
  })
}

pub struct CourierDb {
  pub connection: SqliteConnection,
}

impl CourierDb {
  pub async fn new(database_url: &str) -> anyhow::Result<Self> {
    Ok(CourierDb {
      connection: initialize_db(database_url).await?,
    })
  }

  /// Stores a dispatch and drops rows older than the newest `limit`.
  pub async fn save_history_item(&mut self, item: &HistoryItem, limit: usize) -> anyhow::Result<()> {
    debug!("saving history item {}", item.id);
    let mut transaction = self.connection.begin().await?;
    Self::insert_history(&mut transaction, item).await?;
    sqlx::query("DELETE FROM history WHERE seq NOT IN (SELECT seq FROM history ORDER BY seq DESC LIMIT ?)")
      .bind(i64::try_from(limit)?)
      .execute(&mut *transaction)
      .await?;
    transaction.commit().await?;
    Ok(())
  }

  async fn insert_history(connection: &mut SqliteConnection, item: &HistoryItem) -> anyhow::Result<()> {
    sqlx::query(
      r#"
            INSERT INTO history (id, url, method, headers, params, authorization, body, response, status, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
    )
    .bind(&item.id)
    .bind(&item.url)
    .bind(item.method.to_string())
    .bind(serde_json::to_string(&item.headers)?)
    .bind(serde_json::to_string(&item.params)?)
    .bind(serde_json::to_string(&item.authorization)?)
    .bind(&item.body)
    .bind(serde_json::to_string(&item.response)?)
    .bind(i64::from(item.status))
    .bind(item.timestamp.to_rfc3339())
    .execute(&mut *connection)
    .await?;
    Ok(())
  }

  /// Newest first.
  pub async fn get_history(&mut self) -> anyhow::Result<Vec<HistoryItem>> {
    let rows = sqlx::query("SELECT * FROM history ORDER BY seq DESC")
      .fetch_all(&mut self.connection)
      .await?;
    rows.iter().map(history_from_row).collect()
  }

  pub async fn remove_history_item(&mut self, id: &str) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM history WHERE id = ?")
      .bind(id)
      .execute(&mut self.connection)
      .await?;
    Ok(())
  }

  pub async fn clear_history(&mut self) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM history")
      .execute(&mut self.connection)
      .await?;
    Ok(())
  }

  pub async fn save_request(&mut self, request: &SavedRequest) -> anyhow::Result<()> {
    debug!("saving request {} ({})", request.name, request.id);
    let mut transaction = self.connection.begin().await?;
    Self::upsert_request(&mut transaction, request).await?;
    transaction.commit().await?;
    Ok(())
  }

  async fn upsert_request(connection: &mut SqliteConnection, request: &SavedRequest) -> anyhow::Result<()> {
    sqlx::query(
      r#"
            INSERT INTO saved_request (id, name, url, method, headers, params, authorization, body, description, tags, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
            name = excluded.name, url = excluded.url, method = excluded.method, headers = excluded.headers,
            params = excluded.params, authorization = excluded.authorization, body = excluded.body,
            description = excluded.description, tags = excluded.tags, updated_at = excluded.updated_at
            "#,
    )
    .bind(&request.id)
    .bind(&request.name)
    .bind(&request.url)
    .bind(request.method.to_string())
    .bind(serde_json::to_string(&request.headers)?)
    .bind(serde_json::to_string(&request.params)?)
    .bind(serde_json::to_string(&request.authorization)?)
    .bind(&request.body)
    .bind(&request.description)
    .bind(serde_json::to_string(&request.tags)?)
    .bind(request.created_at.to_rfc3339())
    .bind(request.updated_at.to_rfc3339())
    .execute(&mut *connection)
    .await?;
    Ok(())
  }

  /// In insertion order.
  pub async fn get_saved_requests(&mut self) -> anyhow::Result<Vec<SavedRequest>> {
    let rows = sqlx::query("SELECT * FROM saved_request ORDER BY rowid")
      .fetch_all(&mut self.connection)
      .await?;
    rows.iter().map(saved_from_row).collect()
  }

  pub async fn delete_saved_request(&mut self, id: &str) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM saved_request WHERE id = ?")
      .bind(id)
      .execute(&mut self.connection)
      .await?;
    Ok(())
  }

  pub async fn replace_environment_variables(&mut self, variables: &[EnvironmentVariable]) -> anyhow::Result<()> {
    let mut transaction = self.connection.begin().await?;
    Self::write_environment(&mut transaction, variables).await?;
    transaction.commit().await?;
    Ok(())
  }

  async fn write_environment(connection: &mut SqliteConnection, variables: &[EnvironmentVariable]) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM environment_variable")
      .execute(&mut *connection)
      .await?;
    for (position, variable) in variables.iter().enumerate() {
      sqlx::query("INSERT INTO environment_variable (position, key, value, enabled) VALUES (?, ?, ?, ?)")
        .bind(i64::try_from(position)?)
        .bind(&variable.key)
        .bind(&variable.value)
        .bind(variable.enabled)
        .execute(&mut *connection)
        .await?;
    }
    Ok(())
  }

  pub async fn get_environment_variables(&mut self) -> anyhow::Result<Vec<EnvironmentVariable>> {
    let rows = sqlx::query("SELECT * FROM environment_variable ORDER BY position")
      .fetch_all(&mut self.connection)
      .await?;
    rows
      .iter()
      .map(|row| -> anyhow::Result<EnvironmentVariable> {
        Ok(EnvironmentVariable {
          key: row.try_get("key")?,
          value: row.try_get("value")?,
          enabled: row.try_get("enabled")?,
        })
      })
      .collect()
  }

  /// Swaps every table for the given contents in one transaction. History is newest first.
  pub async fn replace_all(
    &mut self,
    requests: &[SavedRequest],
    history: &[HistoryItem],
    variables: &[EnvironmentVariable],
  ) -> anyhow::Result<()> {
    info!(
      "replacing stored data: {} requests, {} history items, {} variables",
      requests.len(),
      history.len(),
      variables.len()
    );
    let mut transaction = self.connection.begin().await?;
    sqlx::query("DELETE FROM saved_request")
      .execute(&mut *transaction)
      .await?;
    for request in requests {
      Self::upsert_request(&mut transaction, request).await?;
    }
    sqlx::query("DELETE FROM history")
      .execute(&mut *transaction)
      .await?;
    for item in history.iter().rev() {
      Self::insert_history(&mut transaction, item).await?;
    }
    Self::write_environment(&mut transaction, variables).await?;
    transaction.commit().await?;
    Ok(())
  }
}
