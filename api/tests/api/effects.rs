use std::time::Duration;

use courier_api::{
  domain::{request::HttpMethod, response::ResponseData, saved::NewSavedRequest},
  effects::Intent,
  store::{Action, NotificationKind},
};
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::{
  matchers::{method, path},
  Mock, ResponseTemplate,
};

use crate::helpers::{spawn_test_app, spawn_test_app_with, test_config};

#[tokio::test]
async fn successful_send_sets_response_and_appends_history() {
  let test_app = spawn_test_app().await;
  Mock::given(method("GET"))
    .and(path("/json"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"slideshow": {}})))
    .mount(&test_app.test_server)
    .await;

  test_app
    .app
    .dispatch(Intent::Send(test_app.get("/json")))
    .await
    .unwrap();

  let state = test_app.app.state().await;
  assert!(!state.is_loading);
  assert!(state.error.is_none());
  let response = state.response.expect("response should be set");
  assert_eq!(response.status, 200);
  assert_eq!(state.history.len(), 1);
  let item = state.history.iter().next().unwrap();
  assert_eq!(item.url, test_app.url("/json"));
  assert_eq!(item.response, ResponseData::JSON(json!({"slideshow": {}})));

  // history survives a fresh initialize from the database
  test_app.app.apply(Action::ClearHistory).await;
  test_app.app.dispatch(Intent::Initialize).await.unwrap();
  assert_eq!(test_app.app.state().await.history.len(), 1);
}

#[tokio::test]
async fn failed_send_sets_error_and_skips_history() {
  let test_app = spawn_test_app().await;
  Mock::given(path("/boom"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&test_app.test_server)
    .await;

  test_app
    .app
    .dispatch(Intent::Send(test_app.get("/boom")))
    .await
    .unwrap();

  let state = test_app.app.state().await;
  assert!(!state.is_loading);
  assert!(state.response.is_none());
  let error = state.error.expect("error should be set");
  assert_eq!(error.status, 500);
  assert_eq!(error.message, "HTTP 500: Internal Server Error");
  assert!(state.history.is_empty());
}

#[tokio::test]
async fn empty_url_only_notifies() {
  let test_app = spawn_test_app().await;
  test_app
    .app
    .dispatch(Intent::Send(Default::default()))
    .await
    .unwrap();

  let state = test_app.app.state().await;
  assert!(!state.is_loading);
  assert_eq!(state.notification.kind, NotificationKind::Error);
  assert_eq!(state.notification.message, "URL is required");
  assert_eq!(state.errors.len(), 1);
}

#[tokio::test]
async fn empty_url_send_leaves_the_send_in_flight_alone() {
  let test_app = spawn_test_app().await;
  Mock::given(path("/slow"))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_string("slow")
        .set_delay(Duration::from_millis(500)),
    )
    .mount(&test_app.test_server)
    .await;

  let slow = test_app.app.dispatch(Intent::Send(test_app.get("/slow")));
  tokio::time::sleep(Duration::from_millis(50)).await;
  assert!(test_app.app.state().await.is_loading);
  test_app
    .app
    .dispatch(Intent::Send(Default::default()))
    .await
    .unwrap();
  assert_eq!(test_app.app.state().await.notification.message, "URL is required");

  slow.await.unwrap();
  let state = test_app.app.state().await;
  assert!(!state.is_loading);
  assert_eq!(
    state.response.map(|r| r.data),
    Some(ResponseData::TEXT("slow".into()))
  );
  assert_eq!(state.history.len(), 1);
}

#[tokio::test]
async fn latest_send_wins() {
  let test_app = spawn_test_app().await;
  Mock::given(path("/slow"))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_string("slow")
        .set_delay(Duration::from_secs(2)),
    )
    .mount(&test_app.test_server)
    .await;
  Mock::given(path("/fast"))
    .respond_with(ResponseTemplate::new(200).set_body_string("fast"))
    .mount(&test_app.test_server)
    .await;

  let slow = test_app.app.dispatch(Intent::Send(test_app.get("/slow")));
  tokio::time::sleep(Duration::from_millis(50)).await;
  let fast = test_app.app.dispatch(Intent::Send(test_app.get("/fast")));

  fast.await.unwrap();
  let slow_result = slow.await;
  assert!(slow_result.unwrap_err().is_cancelled());

  let state = test_app.app.state().await;
  assert!(!state.is_loading);
  assert_eq!(
    state.response.map(|r| r.data),
    Some(ResponseData::TEXT("fast".into()))
  );
  assert_eq!(state.history.len(), 1);
}

#[tokio::test]
async fn save_update_and_delete_requests_round_trip_through_the_database() {
  let test_app = spawn_test_app().await;
  let new_request = NewSavedRequest {
    name: "list users".into(),
    url: "https://api.example.com/users".into(),
    method: HttpMethod::GET,
    tags: vec!["users".into()],
    ..Default::default()
  };

  test_app.app.dispatch(Intent::Save(new_request)).await.unwrap();
  let state = test_app.app.state().await;
  assert_eq!(state.notification.message, "Request saved successfully");
  assert_eq!(state.saved_requests.len(), 1);

  let mut saved = state.saved_requests[0].clone();
  saved.name = "all users".into();
  test_app
    .app
    .dispatch(Intent::UpdateSaved(saved.clone()))
    .await
    .unwrap();

  test_app.app.apply(Action::SetSavedRequests(vec![])).await;
  test_app.app.dispatch(Intent::LoadSaved).await.unwrap();
  let state = test_app.app.state().await;
  assert_eq!(state.saved_requests.len(), 1);
  assert_eq!(state.saved_requests[0].name, "all users");
  assert_eq!(state.saved_requests[0].tags, vec!["users".to_string()]);

  test_app
    .app
    .dispatch(Intent::DeleteSaved(saved.id.clone()))
    .await
    .unwrap();
  test_app.app.dispatch(Intent::LoadSaved).await.unwrap();
  assert!(test_app.app.state().await.saved_requests.is_empty());
}

#[tokio::test]
async fn clear_and_remove_history_reach_the_database() {
  let test_app = spawn_test_app().await;
  Mock::given(path("/ok"))
    .respond_with(ResponseTemplate::new(200))
    .mount(&test_app.test_server)
    .await;
  for _ in 0..3 {
    test_app
      .app
      .dispatch(Intent::Send(test_app.get("/ok")))
      .await
      .unwrap();
  }
  let newest = test_app.app.state().await.history.iter().next().unwrap().id.clone();
  test_app
    .app
    .dispatch(Intent::RemoveHistoryItem(newest.clone()))
    .await
    .unwrap();
  test_app.app.dispatch(Intent::Initialize).await.unwrap();
  let state = test_app.app.state().await;
  assert_eq!(state.history.len(), 2);
  assert!(state.history.get(&newest).is_none());

  test_app.app.dispatch(Intent::ClearHistory).await.unwrap();
  test_app.app.dispatch(Intent::Initialize).await.unwrap();
  assert!(test_app.app.state().await.history.is_empty());
}

#[tokio::test]
async fn environment_variables_are_used_and_persisted() {
  let test_app = spawn_test_app().await;
  Mock::given(path("/env"))
    .respond_with(ResponseTemplate::new(200))
    .expect(1)
    .mount(&test_app.test_server)
    .await;

  test_app
    .app
    .apply(Action::AddEnvironmentVariable {
      key: "HOST_URL".into(),
      value: test_app.test_server.uri(),
    })
    .await;
  test_app.app.dispatch(Intent::SaveEnvironment).await.unwrap();
  test_app.app.apply(Action::SetEnvironmentVariables(vec![])).await;
  test_app.app.dispatch(Intent::Initialize).await.unwrap();

  let mut request = test_app.get("/env");
  request.url = "{{HOST_URL}}/env".into();
  test_app.app.dispatch(Intent::Send(request)).await.unwrap();
  assert_eq!(test_app.app.state().await.response.map(|r| r.status), Some(200));
}

#[tokio::test]
async fn export_then_import_restores_everything() {
  let test_app = spawn_test_app().await;
  let dir = tempfile::tempdir().unwrap();
  let export_path = dir.path().join("courier-export.json");

  test_app
    .app
    .dispatch(Intent::Save(NewSavedRequest {
      name: "health".into(),
      url: "http://localhost/health".into(),
      ..Default::default()
    }))
    .await
    .unwrap();
  test_app
    .app
    .apply(Action::AddEnvironmentVariable {
      key: "TOKEN".into(),
      value: "abc".into(),
    })
    .await;
  test_app
    .app
    .dispatch(Intent::Export(export_path.clone()))
    .await
    .unwrap();
  assert_eq!(
    test_app.app.state().await.notification.message,
    "Data exported successfully"
  );

  let exported: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(&export_path).unwrap()).unwrap();
  assert_eq!(exported["requests"][0]["name"], "health");
  assert_eq!(exported["environmentVariables"][0]["key"], "TOKEN");
  assert!(exported["exportDate"].is_string());

  let other = spawn_test_app().await;
  other
    .app
    .dispatch(Intent::Import(export_path))
    .await
    .unwrap();
  let state = other.app.state().await;
  assert_eq!(state.notification.message, "Data imported successfully");
  assert_eq!(state.saved_requests[0].name, "health");
  assert_eq!(state.environment.substitute("{{TOKEN}}"), "abc");
}

#[tokio::test]
async fn import_of_missing_file_reports_failure() {
  let test_app = spawn_test_app().await;
  test_app
    .app
    .dispatch(Intent::Import("/definitely/not/here.json".into()))
    .await
    .unwrap();
  let state = test_app.app.state().await;
  assert_eq!(state.notification.kind, NotificationKind::Error);
  assert_eq!(state.notification.message, "Failed to import data");
  assert_eq!(state.errors.len(), 1);
}

#[tokio::test]
async fn notifications_hide_after_their_duration() {
  let mut config = test_config();
  config.notification_duration = Duration::from_millis(50);
  let test_app = spawn_test_app_with(config).await;

  test_app
    .app
    .notify(NotificationKind::Info, "hello")
    .await;
  assert!(test_app.app.state().await.notification.is_visible);
  tokio::time::sleep(Duration::from_millis(200)).await;
  assert!(!test_app.app.state().await.notification.is_visible);
}

#[tokio::test]
async fn a_newer_notification_outlives_the_older_timer() {
  let mut config = test_config();
  config.notification_duration = Duration::from_millis(200);
  let test_app = spawn_test_app_with(config).await;

  test_app.app.notify(NotificationKind::Info, "first").await;
  tokio::time::sleep(Duration::from_millis(100)).await;
  test_app.app.notify(NotificationKind::Success, "second").await;

  // the first timer fires around 200ms, the second around 300ms
  tokio::time::sleep(Duration::from_millis(150)).await;
  let notification = test_app.app.state().await.notification;
  assert!(notification.is_visible);
  assert_eq!(notification.message, "second");

  tokio::time::sleep(Duration::from_millis(200)).await;
  assert!(!test_app.app.state().await.notification.is_visible);
}

#[tokio::test]
async fn intents_can_arrive_over_a_channel() {
  let test_app = spawn_test_app().await;
  let (tx, rx) = mpsc::channel(8);
  let runner = tokio::spawn(test_app.app.clone().run(rx));

  tx.send(Intent::Save(NewSavedRequest {
    name: "from channel".into(),
    url: "http://localhost".into(),
    ..Default::default()
  }))
  .await
  .unwrap();
  drop(tx);
  runner.await.unwrap();

  // the save runs on its own task; give it a moment to land
  for _ in 0..50 {
    if !test_app.app.state().await.saved_requests.is_empty() {
      break;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  assert_eq!(test_app.app.state().await.saved_requests[0].name, "from channel");
}
