use thiserror::Error;

#[derive(Debug, Error)]
pub enum CourierError {
    #[error("URL is required")]
    UrlRequired,

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header {name}")]
    InvalidHeader { name: String },

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl CourierError {
    /// HTTP status carried by the failure, 0 when the server never answered.
    pub fn status(&self) -> u16 {
        match self {
            CourierError::Status { status, .. } => *status,
            _ => 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, CourierError>;
