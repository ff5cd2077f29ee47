use chrono::Utc;
use courier_api::domain::{
  environment::EnvironmentVariable,
  history::HistoryItem,
  request::{Authorization, HttpMethod, QueryParams, RequestHeaders},
  response::ResponseData,
  saved::{NewSavedRequest, SavedRequest},
};
use serde_json::json;

use crate::helpers::initialize_test_db;

fn history_item(n: usize) -> HistoryItem {
  HistoryItem {
    id: format!("item-{n}"),
    url: format!("https://example.com/{n}"),
    method: HttpMethod::POST,
    headers: vec![("Accept", "application/json")].into_iter().collect::<RequestHeaders>(),
    params: vec![("n", n.to_string())].into_iter().collect::<QueryParams>(),
    authorization: Authorization::Bearer {
      token: "t".into(),
    },
    body: Some(r#"{"n":1}"#.into()),
    response: ResponseData::JSON(json!({"n": n})),
    status: 201,
    timestamp: Utc::now(),
  }
}

#[tokio::test]
async fn history_is_newest_first_and_trimmed() {
  let mut db = initialize_test_db().await.unwrap();
  let items: Vec<HistoryItem> = (0..5).map(history_item).collect();
  for item in &items {
    db.save_history_item(item, 3).await.unwrap();
  }
  let history = db.get_history().await.unwrap();
  let ids: Vec<&str> = history.iter().map(|h| h.id.as_str()).collect();
  assert_eq!(ids, vec!["item-4", "item-3", "item-2"]);
  assert_eq!(history[0], items[4]);
}

#[tokio::test]
async fn saved_requests_upsert_in_place() {
  let mut db = initialize_test_db().await.unwrap();
  let first = SavedRequest::create(NewSavedRequest {
    name: "first".into(),
    url: "http://localhost/1".into(),
    ..Default::default()
  });
  let second = SavedRequest::create(NewSavedRequest {
    name: "second".into(),
    url: "http://localhost/2".into(),
    description: Some("two".into()),
    ..Default::default()
  });
  db.save_request(&first).await.unwrap();
  db.save_request(&second).await.unwrap();

  let mut renamed = first.clone();
  renamed.name = "renamed".into();
  db.save_request(&renamed).await.unwrap();

  let saved = db.get_saved_requests().await.unwrap();
  assert_eq!(saved.len(), 2);
  assert_eq!(saved[0].name, "renamed");
  assert_eq!(saved[1].description.as_deref(), Some("two"));

  db.delete_saved_request(&first.id).await.unwrap();
  assert_eq!(db.get_saved_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn environment_variables_keep_order_and_flags() {
  let mut db = initialize_test_db().await.unwrap();
  let variables = vec![
    EnvironmentVariable {
      key: "B".into(),
      value: "2".into(),
      enabled: false,
    },
    EnvironmentVariable {
      key: "A".into(),
      value: "1".into(),
      enabled: true,
    },
  ];
  db.replace_environment_variables(&variables).await.unwrap();
  assert_eq!(db.get_environment_variables().await.unwrap(), variables);

  db.replace_environment_variables(&variables[1..]).await.unwrap();
  assert_eq!(db.get_environment_variables().await.unwrap(), variables[1..].to_vec());
}

#[tokio::test]
async fn replace_all_keeps_history_order() {
  let mut db = initialize_test_db().await.unwrap();
  db.save_history_item(&history_item(99), 100).await.unwrap();
  let history = vec![history_item(3), history_item(2), history_item(1)];
  db.replace_all(&[], &history, &[]).await.unwrap();

  let stored = db.get_history().await.unwrap();
  let ids: Vec<&str> = stored.iter().map(|h| h.id.as_str()).collect();
  assert_eq!(ids, vec!["item-3", "item-2", "item-1"]);
  assert!(db.get_saved_requests().await.unwrap().is_empty());
}
