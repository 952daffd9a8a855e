use thiserror::Error;

/// Failure talking to the backend. Only ever logged; the UI shows a fixed
/// message whatever the variant.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}
