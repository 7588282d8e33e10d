use thiserror::Error;

/// Terminal errors raised by a check before any finding is recorded
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("no data received")]
    NoData,

    #[error("result from {0}")]
    WrongTarget(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl From<config::ConfigError> for CheckError {
    fn from(error: config::ConfigError) -> Self {
        CheckError::Config(error.to_string())
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(error: serde_json::Error) -> Self {
        CheckError::Snapshot(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
