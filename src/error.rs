use thiserror::Error;

/// Every failure a core operation can report.
///
/// Store failures come up from the persistence layer as `anyhow::Error` and
/// convert only into [`Error::Store`]. Nothing else converts implicitly.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("authentication token is missing")]
    Unauthenticated,

    #[error("authentication token is not valid")]
    InvalidToken,

    #[error("not found")]
    NotFound,

    #[error("not allowed")]
    Forbidden,

    #[error("a user with this email already exists")]
    EmailTaken,

    #[error("please enter the correct credentials")]
    InvalidCredentials,

    #[error("store failure: {0:#}")]
    Store(#[from] anyhow::Error),

    #[error("internal failure: {0:#}")]
    Internal(anyhow::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
