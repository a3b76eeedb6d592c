use thiserror::Error;

/// Failures surfaced by a [`JobRepository`](crate::api::JobRepository).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("{0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body does not decode into a job application.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepositoryError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RepositoryError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            RepositoryError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
