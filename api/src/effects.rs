//! Side effects triggered by user intents.
//!
//! The [`Coordinator`] owns the shared [`RequestState`] and reacts to each
//! [`Intent`] on its own task, feeding results back through the reducer.
//! Sends and saved-request loads keep only the latest task alive; everything
//! else runs to completion.

use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex as StdMutex, PoisonError,
    },
};

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::{
    sync::{mpsc, Mutex, RwLock},
    task::{AbortHandle, JoinHandle},
};

use crate::config::Config;
use crate::db::repository::CourierDb;
use crate::domain::{
    export::ExportBundle,
    history::{History, HistoryItem, HISTORY_LIMIT},
    request::CurrentRequest,
    response::RequestError,
    saved::{NewSavedRequest, SavedRequest},
};
use crate::error::Result;
use crate::store::{Action, NotificationKind, RequestState};
use crate::CourierApi;

#[derive(Debug)]
pub enum Intent {
    Initialize,
    Send(CurrentRequest),
    Save(NewSavedRequest),
    UpdateSaved(SavedRequest),
    DeleteSaved(String),
    LoadSaved,
    RemoveHistoryItem(String),
    ClearHistory,
    SaveEnvironment,
    Export(PathBuf),
    Import(PathBuf),
}

struct Inner {
    state: RwLock<RequestState>,
    db: Mutex<CourierDb>,
    api: CourierApi,
    config: Config,
    send_generation: AtomicU64,
    in_flight_send: StdMutex<Option<AbortHandle>>,
    in_flight_load: StdMutex<Option<AbortHandle>>,
}

#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    pub async fn new(config: Config) -> Result<Self> {
        let db = CourierDb::new(&config.database_url).await?;
        let api = CourierApi::new(&config)?;
        Ok(Self::with_parts(api, db, config))
    }

    pub fn with_parts(api: CourierApi, db: CourierDb, config: Config) -> Self {
        Coordinator {
            inner: Arc::new(Inner {
                state: RwLock::new(RequestState::default()),
                db: Mutex::new(db),
                api,
                config,
                send_generation: AtomicU64::new(0),
                in_flight_send: StdMutex::new(None),
                in_flight_load: StdMutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub async fn state(&self) -> RequestState {
        self.inner.state.read().await.clone()
    }

    pub async fn apply(&self, action: Action) {
        self.inner.state.write().await.apply(action);
    }

    /// Starts the effect for `intent`. Must be called inside a tokio runtime.
    pub fn dispatch(&self, intent: Intent) -> JoinHandle<()> {
        debug!("dispatching {:?}", intent);
        match intent {
            // rejected before it can supersede the send in flight
            Intent::Send(ref request) if request.url.trim().is_empty() => {
                self.spawn_every(|this| async move {
                    this.notify(NotificationKind::Error, "URL is required").await
                })
            }
            Intent::Send(request) => {
                let generation = self.inner.send_generation.fetch_add(1, Ordering::SeqCst) + 1;
                let this = self.clone();
                Self::take_latest(&self.inner.in_flight_send, async move {
                    this.send_request(generation, request).await
                })
            }
            Intent::LoadSaved => {
                let this = self.clone();
                Self::take_latest(&self.inner.in_flight_load, async move {
                    this.load_saved_requests().await
                })
            }
            Intent::Initialize => self.spawn_every(|this| async move {
                if let Err(e) = this.initialize().await {
                    error!("failed to initialize: {:#}", e);
                    this.notify(NotificationKind::Error, "Failed to initialize app")
                        .await;
                }
            }),
            Intent::Save(input) => self.spawn_every(|this| async move {
                let result = this.save_request(input).await;
                this.report(result, "Request saved successfully", "Failed to save request")
                    .await
            }),
            Intent::UpdateSaved(request) => self.spawn_every(|this| async move {
                let result = this.update_saved_request(request).await;
                this.report(result, "Request updated successfully", "Failed to update request")
                    .await
            }),
            Intent::DeleteSaved(id) => self.spawn_every(|this| async move {
                this.apply(Action::DeleteSavedRequest(id.clone())).await;
                if let Err(e) = this.inner.db.lock().await.delete_saved_request(&id).await {
                    this.record_error(format!("Failed to delete saved request {id}: {e:#}"))
                        .await;
                }
            }),
            Intent::RemoveHistoryItem(id) => self.spawn_every(|this| async move {
                this.apply(Action::RemoveFromHistory(id.clone())).await;
                if let Err(e) = this.inner.db.lock().await.remove_history_item(&id).await {
                    this.record_error(format!("Failed to remove history item {id}: {e:#}"))
                        .await;
                }
            }),
            Intent::ClearHistory => self.spawn_every(|this| async move {
                this.apply(Action::ClearHistory).await;
                match this.inner.db.lock().await.clear_history().await {
                    Ok(()) => info!("Request history cleared"),
                    Err(e) => {
                        this.record_error(format!("Failed to clear history: {e:#}"))
                            .await
                    }
                }
            }),
            Intent::SaveEnvironment => self.spawn_every(|this| async move {
                let result = this.save_environment().await;
                this.report(
                    result,
                    "Environment variables saved",
                    "Failed to save environment variables",
                )
                .await
            }),
            Intent::Export(path) => self.spawn_every(|this| async move {
                let result = this.export_data(&path).await;
                this.report(result, "Data exported successfully", "Failed to export data")
                    .await
            }),
            Intent::Import(path) => self.spawn_every(|this| async move {
                let result = this.import_data(&path).await;
                this.report(result, "Data imported successfully", "Failed to import data")
                    .await
            }),
        }
    }

    /// Dispatches intents from a channel until every sender is dropped.
    pub async fn run(self, mut intents: mpsc::Receiver<Intent>) {
        while let Some(intent) = intents.recv().await {
            self.dispatch(intent);
        }
        debug!("intent channel closed");
    }

    fn spawn_every<F, Fut>(&self, effect: F) -> JoinHandle<()>
    where
        F: FnOnce(Coordinator) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(effect(self.clone()))
    }

    fn take_latest<F>(slot: &StdMutex<Option<AbortHandle>>, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        let handle = tokio::spawn(task);
        *slot = Some(handle.abort_handle());
        handle
    }

    async fn report(&self, result: anyhow::Result<()>, success: &str, failure: &str) {
        match result {
            Ok(()) => self.notify(NotificationKind::Success, success).await,
            Err(e) => {
                error!("{}: {:#}", failure, e);
                self.notify(NotificationKind::Error, failure).await
            }
        }
    }

    async fn send_request(&self, generation: u64, request: CurrentRequest) {
        let environment = {
            let mut state = self.inner.state.write().await;
            state.apply(Action::SendRequest);
            state.apply(Action::ClearError);
            state.environment.clone()
        };

        let result = self.inner.api.make_request(&request, &environment).await;

        let persist = {
            let mut state = self.inner.state.write().await;
            if self.inner.send_generation.load(Ordering::SeqCst) != generation {
                debug!("dropping result of superseded send #{}", generation);
                return;
            }
            let persist = match result {
                Ok(response) => {
                    let item = HistoryItem::new(&request, &response);
                    state.apply(Action::SetResponse(response));
                    state.apply(Action::AddToHistory(item.clone()));
                    // own task: a newer send aborts this one, never the write
                    let this = self.clone();
                    Some(tokio::spawn(async move {
                        this.persist_history_item(item).await
                    }))
                }
                Err(e) => {
                    warn!("request failed: {}", e);
                    state.apply(Action::SetError(RequestError::from(&e)));
                    None
                }
            };
            state.apply(Action::SetLoading(false));
            persist
        };

        if let Some(persist) = persist {
            if let Err(e) = persist.await {
                error!("history write task failed: {}", e);
            }
        }
    }

    async fn persist_history_item(&self, item: HistoryItem) {
        let saved = self
            .inner
            .db
            .lock()
            .await
            .save_history_item(&item, HISTORY_LIMIT)
            .await;
        if let Err(e) = saved {
            self.record_error(format!("Failed to save history item: {e:#}"))
                .await;
        }
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        let (history, saved, variables) = {
            let mut db = self.inner.db.lock().await;
            (
                db.get_history().await?,
                db.get_saved_requests().await?,
                db.get_environment_variables().await?,
            )
        };
        info!(
            "loaded {} history items, {} saved requests, {} variables",
            history.len(),
            saved.len(),
            variables.len()
        );
        let mut state = self.inner.state.write().await;
        state.apply(Action::SetHistory(history));
        state.apply(Action::SetSavedRequests(saved));
        state.apply(Action::SetEnvironmentVariables(variables));
        Ok(())
    }

    async fn load_saved_requests(&self) {
        let loaded = self.inner.db.lock().await.get_saved_requests().await;
        match loaded {
            Ok(saved) => self.apply(Action::SetSavedRequests(saved)).await,
            Err(e) => {
                self.record_error(format!("Failed to load saved requests: {e:#}"))
                    .await
            }
        }
    }

    async fn save_request(&self, input: NewSavedRequest) -> anyhow::Result<()> {
        let saved = SavedRequest::create(input);
        self.apply(Action::SaveRequest(saved.clone())).await;
        self.inner.db.lock().await.save_request(&saved).await
    }

    async fn update_saved_request(&self, request: SavedRequest) -> anyhow::Result<()> {
        let id = request.id.clone();
        let updated = {
            let mut state = self.inner.state.write().await;
            state.apply(Action::UpdateSavedRequest(request));
            state.saved_requests.iter().find(|r| r.id == id).cloned()
        };
        match updated {
            Some(updated) => self.inner.db.lock().await.save_request(&updated).await,
            None => anyhow::bail!("no saved request with id {id}"),
        }
    }

    async fn save_environment(&self) -> anyhow::Result<()> {
        let variables = self.inner.state.read().await.environment.variables().to_vec();
        self.inner
            .db
            .lock()
            .await
            .replace_environment_variables(&variables)
            .await
    }

    async fn export_data(&self, path: &Path) -> anyhow::Result<()> {
        let bundle = {
            let state = self.inner.state.read().await;
            ExportBundle {
                requests: state.saved_requests.clone(),
                history: state.history.iter().cloned().collect(),
                environment_variables: state.environment.variables().to_vec(),
                export_date: Utc::now(),
            }
        };
        let json = serde_json::to_string_pretty(&bundle)?;
        tokio::fs::write(path, json).await?;
        info!("exported data to {}", path.display());
        Ok(())
    }

    async fn import_data(&self, path: &Path) -> anyhow::Result<()> {
        let raw = tokio::fs::read_to_string(path).await?;
        let bundle: ExportBundle = serde_json::from_str(&raw)?;
        let history: Vec<HistoryItem> = History::from_items(bundle.history).iter().cloned().collect();
        self.inner
            .db
            .lock()
            .await
            .replace_all(&bundle.requests, &history, &bundle.environment_variables)
            .await?;
        let mut state = self.inner.state.write().await;
        state.apply(Action::SetSavedRequests(bundle.requests));
        state.apply(Action::SetHistory(history));
        state.apply(Action::SetEnvironmentVariables(bundle.environment_variables));
        Ok(())
    }

    /// Shows a notification and schedules its auto-hide. Errors are also logged.
    pub async fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        let message = message.into();
        let sequence = {
            let mut state = self.inner.state.write().await;
            if kind == NotificationKind::Error {
                state.apply(Action::LogError(message.clone()));
            }
            state.apply(Action::ShowNotification { kind, message });
            state.notification.sequence
        };

        let duration = self.inner.config.notification_duration;
        if duration.is_zero() {
            return;
        }
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut state = this.inner.state.write().await;
            if state.notification.sequence == sequence {
                state.apply(Action::HideNotification);
            }
        });
    }

    async fn record_error(&self, message: String) {
        error!("{}", message);
        self.apply(Action::LogError(message)).await;
    }
}
