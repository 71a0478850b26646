use thiserror::Error;

/// Error taxonomy for every remote operation.
///
/// `Validation` is raised before any request leaves the process; the other
/// variants classify how a request that did go out came back. Nothing in this
/// crate panics on a remote failure.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// The service answered with `status: false`; the message is the
    /// server-supplied one when present.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("transport failure: {0}")]
    Transport(String),

    /// The envelope parsed but `data` was not the shape the operation needed.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
