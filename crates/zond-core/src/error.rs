use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZondError {
    #[error("tracking id must not be empty")]
    EmptyTrackingId,

    #[error("tokio runtime unavailable: {reason}")]
    RuntimeUnavailable { reason: String },

    #[error("no config directory available for the preference store")]
    NoConfigDir,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ZondError>;
