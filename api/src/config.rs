use std::{path::Path, time::Duration};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:courier.sqlite";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub request_timeout: Duration,
    /// How long a notification stays visible, zero keeps it until replaced.
    pub notification_duration: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            notification_duration: Duration::from_millis(5000),
            user_agent: format!("courier/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    pub fn with_database_path(path: impl AsRef<Path>) -> Self {
        Config {
            database_url: format!("sqlite:{}", path.as_ref().display()),
            ..Default::default()
        }
    }

    /// Throwaway database for tests and one-off sends.
    pub fn in_memory() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            ..Default::default()
        }
    }
}
