use crate::guard::RejectReason;
use thiserror::Error;

pub type QarkResult<T> = Result<T, QarkError>;

#[derive(Error, Debug)]
pub enum QarkError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Submission rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
