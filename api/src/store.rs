use chrono::{DateTime, Utc};

use crate::domain::{
    environment::{Environment, EnvironmentVariable},
    history::{History, HistoryItem},
    request::{Authorization, CurrentRequest, HttpMethod, QueryParams, RequestHeaders},
    response::{RequestError, Response},
    saved::SavedRequest,
};
use crate::utilities::formatting::format_json;

/// Number of error messages kept for debugging.
pub const ERROR_LOG_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub is_visible: bool,
    /// Bumped on every show so a pending auto-hide can tell it was superseded.
    pub sequence: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggedError {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SetUrl(String),
    SetMethod(HttpMethod),
    SetHeaders(RequestHeaders),
    AddHeader { key: String, value: String },
    RemoveHeader(String),
    SetParams(QueryParams),
    AddParam { key: String, value: String },
    RemoveParam(String),
    SetAuthorization(Authorization),
    SetBody(String),
    ResetCurrentRequest,

    SendRequest,
    SetLoading(bool),
    SetResponse(Response),
    SetError(RequestError),
    ClearError,
    ClearResponse,

    AddToHistory(HistoryItem),
    RemoveFromHistory(String),
    ClearHistory,
    SetHistory(Vec<HistoryItem>),

    SaveRequest(SavedRequest),
    UpdateSavedRequest(SavedRequest),
    DeleteSavedRequest(String),
    SetSavedRequests(Vec<SavedRequest>),
    LoadSavedRequestToCurrent(String),
    LoadHistoryItemToCurrent(String),

    SetEnvironmentVariables(Vec<EnvironmentVariable>),
    AddEnvironmentVariable { key: String, value: String },
    UpdateEnvironmentVariable(EnvironmentVariable),
    RemoveEnvironmentVariable(String),
    ToggleEnvironmentVariable(String),

    ShowNotification { kind: NotificationKind, message: String },
    HideNotification,
    LogError(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestState {
    pub current_request: CurrentRequest,
    pub response: Option<Response>,
    pub error: Option<RequestError>,
    pub is_loading: bool,
    pub history: History,
    pub saved_requests: Vec<SavedRequest>,
    pub environment: Environment,
    pub notification: Notification,
    pub errors: Vec<LoggedError>,
}

impl RequestState {
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SetUrl(url) => self.current_request.url = url,
            Action::SetMethod(method) => self.current_request.method = method,
            Action::SetHeaders(headers) => self.current_request.headers = headers,
            Action::AddHeader { key, value } => self.current_request.headers.set(key, value),
            Action::RemoveHeader(key) => {
                self.current_request.headers.remove(&key);
            }
            Action::SetParams(params) => self.current_request.params = params,
            Action::AddParam { key, value } => self.current_request.params.set(key, value),
            Action::RemoveParam(key) => {
                self.current_request.params.remove(&key);
            }
            Action::SetAuthorization(authorization) => {
                self.current_request.authorization = authorization
            }
            Action::SetBody(body) => self.current_request.body = body,
            Action::ResetCurrentRequest => {
                self.current_request = CurrentRequest::default();
                self.response = None;
                self.error = None;
            }

            Action::SendRequest => self.is_loading = true,
            Action::SetLoading(loading) => self.is_loading = loading,
            Action::SetResponse(response) => {
                self.response = Some(response);
                self.error = None;
            }
            Action::SetError(error) => {
                self.error = Some(error);
                self.response = None;
            }
            Action::ClearError => self.error = None,
            Action::ClearResponse => {
                self.response = None;
                self.error = None;
            }

            Action::AddToHistory(item) => self.history.push(item),
            Action::RemoveFromHistory(id) => {
                self.history.remove(&id);
            }
            Action::ClearHistory => self.history.clear(),
            Action::SetHistory(items) => self.history = History::from_items(items),

            Action::SaveRequest(request) => self.saved_requests.push(request),
            Action::UpdateSavedRequest(mut request) => {
                if let Some(existing) = self.saved_requests.iter_mut().find(|r| r.id == request.id) {
                    request.touch();
                    *existing = request;
                }
            }
            Action::DeleteSavedRequest(id) => self.saved_requests.retain(|r| r.id != id),
            Action::SetSavedRequests(requests) => self.saved_requests = requests,
            Action::LoadSavedRequestToCurrent(id) => {
                if let Some(saved) = self.saved_requests.iter().find(|r| r.id == id) {
                    self.current_request = CurrentRequest {
                        url: saved.url.clone(),
                        method: saved.method,
                        headers: saved.headers.clone(),
                        params: saved.params.clone(),
                        authorization: saved.authorization.clone(),
                        body: saved.body.as_deref().map(format_json).unwrap_or_default(),
                    };
                }
            }
            Action::LoadHistoryItemToCurrent(id) => {
                if let Some(item) = self.history.get(&id) {
                    self.current_request = CurrentRequest {
                        url: item.url.clone(),
                        method: item.method,
                        headers: item.headers.clone(),
                        params: item.params.clone(),
                        authorization: item.authorization.clone(),
                        body: item.body.as_deref().map(format_json).unwrap_or_default(),
                    };
                }
            }

            Action::SetEnvironmentVariables(variables) => {
                self.environment = Environment::new(variables)
            }
            Action::AddEnvironmentVariable { key, value } => self.environment.add(key, value),
            Action::UpdateEnvironmentVariable(variable) => self.environment.update(variable),
            Action::RemoveEnvironmentVariable(key) => self.environment.remove(&key),
            Action::ToggleEnvironmentVariable(key) => self.environment.toggle(&key),

            Action::ShowNotification { kind, message } => {
                self.notification = Notification {
                    kind,
                    message,
                    is_visible: true,
                    sequence: self.notification.sequence + 1,
                };
            }
            Action::HideNotification => self.notification.is_visible = false,
            Action::LogError(message) => {
                self.errors.push(LoggedError {
                    message,
                    timestamp: Utc::now(),
                });
                if self.errors.len() > ERROR_LOG_LIMIT {
                    let overflow = self.errors.len() - ERROR_LOG_LIMIT;
                    self.errors.drain(..overflow);
                }
            }
        }
    }
}
