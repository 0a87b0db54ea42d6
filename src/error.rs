use thiserror::Error;

/// Failure talking to a remote provider (maps, places or text generation).
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status} from {endpoint}")]
    Http { endpoint: String, status: u16 },
    #[error("provider returned status {status}: {message}")]
    Status {
        status: String,
        message: String,
        retryable: bool,
    },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Whether another attempt of the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            RemoteError::Http { status, .. } => *status == 429 || *status >= 500,
            RemoteError::Status { retryable, .. } => *retryable,
            RemoteError::InvalidResponse(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to retrieve a valid connection from postgres pool: {0}")]
    Pool(String),
    #[error("database error: {0}")]
    Database(#[from] bb8_postgres::tokio_postgres::Error),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{operation} unavailable: {source}")]
    RemoteUnavailable {
        operation: &'static str,
        #[source]
        source: RemoteError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to summarize restaurant #{index} ({name}): {source}")]
    Summary {
        index: usize,
        name: String,
        #[source]
        source: RemoteError,
    },
}

impl LookupError {
    pub fn remote(operation: &'static str, source: RemoteError) -> Self {
        LookupError::RemoteUnavailable { operation, source }
    }
}
