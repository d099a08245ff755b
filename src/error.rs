use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between a view and the backend.
///
/// Transport, status and decode failures all collapse into a single message
/// via [`Error::message`], which is what views store and show.
#[derive(Debug, Error)]
pub enum Error {
    #[error("error reaching backend: {0}")]
    ErrorReachingBackend(reqwest::Error),
    #[error("{1}")]
    StatusCodeError(StatusCode, String),
    #[error("error decoding response: {0}")]
    ErrorDecodingResponse(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// A 404 means the resource is gone, not that the backend hiccuped.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::StatusCodeError(status, _) if *status == StatusCode::NOT_FOUND)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
