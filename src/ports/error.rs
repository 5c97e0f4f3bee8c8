//! Error taxonomy shared by every fallible remote operation.
//!
//! Transport and HTTP failures are normalized into exactly one
//! [`RepositoryError`] kind before they leave the repository, so use cases and
//! view-models only ever see `RepositoryResult<T>`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NoInternet(String),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Response(String),

    #[error("{0}")]
    Request(String),

    #[error("{0}")]
    Failure(String),

    /// Generic network error (bad request, forbidden, gateway failures).
    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Unknown(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    TooManyRequests(String),

    #[error("{0}")]
    ServiceUnavailable(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Map a non-success HTTP status to its error kind.
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => Self::Unauthorized("Unauthorized access".to_string()),
            500 => Self::Server("Server error".to_string()),
            503 => Self::ServiceUnavailable("Service unavailable".to_string()),
            408 => Self::Timeout("Request timeout".to_string()),
            429 => Self::TooManyRequests("Too many requests".to_string()),
            403 => Self::Network("Forbidden".to_string()),
            404 => Self::NotFound("Not found".to_string()),
            400 => Self::Network("Bad request".to_string()),
            502 => Self::Network("Bad gateway".to_string()),
            504 => Self::Network("Gateway timeout".to_string()),
            _ => Self::Unknown("Unknown error".to_string()),
        }
    }

    pub fn no_internet() -> Self {
        Self::NoInternet("No internet connection".to_string())
    }

    pub fn timed_out() -> Self {
        Self::Timeout("No server response, request timed out".to_string())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized(m)
            | Self::NoInternet(m)
            | Self::Server(m)
            | Self::Timeout(m)
            | Self::Connection(m)
            | Self::Response(m)
            | Self::Request(m)
            | Self::Failure(m)
            | Self::Network(m)
            | Self::Unknown(m)
            | Self::NotFound(m)
            | Self::TooManyRequests(m)
            | Self::ServiceUnavailable(m) => m,
        }
    }

    /// Unauthorized failures are never offered a retry action.
    pub fn can_retry(&self) -> bool {
        !matches!(self, Self::Unauthorized(_))
    }
}
