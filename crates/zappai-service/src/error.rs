//! Service-level errors: a `ZappaiError` from the core library, widened with
//! the failure modes an async boundary introduces (I/O, data sources).

use thiserror::Error;
use zappai_core::ZappaiError;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] ZappaiError),

    #[error("external data source failed after retries: {0}")]
    DownloadFailed(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task panicked: {0}")]
    TaskJoin(String),
}

impl ServiceError {
    /// Stable kind string for the `{ "error": <kind> }` response shape
    /// (`predictions_router.py`'s error payloads).
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Core(e) => e.kind(),
            ServiceError::DownloadFailed(_) => "download_failed",
            ServiceError::Csv(_) => "csv_error",
            ServiceError::Io(_) => "io_error",
            ServiceError::TaskJoin(_) => "task_join_error",
        }
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(e: tokio::task::JoinError) -> Self {
        ServiceError::TaskJoin(e.to_string())
    }
}
