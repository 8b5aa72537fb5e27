use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use mongodb::error::Error as DbError;
use rocket::{
    http::{Status, StatusClass},
    response::Responder,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// All the ways a request can fail.
///
/// `DuplicateVote` is a business-rule rejection, not a system fault; it is
/// never retried. `DataUnavailable` wraps any storage failure and is safe
/// for the caller to retry with backoff; nothing in between swallows it.
#[derive(Debug, Error)]
pub enum Error {
    /// The storage backend could not be read or written.
    #[error("Data unavailable: {0}")]
    DataUnavailable(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// The student has already cast their one ballot.
    #[error("Duplicate vote: {0}")]
    DuplicateVote(String),
    /// Catch-all for less common statuses.
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{what} not found"))
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = match self {
            Self::BadRequest(_) => Status::BadRequest,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::NotFound(_) => Status::NotFound,
            Self::DuplicateVote(_) => Status::Conflict,
            Self::DataUnavailable(_) => Status::ServiceUnavailable,
            Self::Jwt(ref err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::Status(status, _) => status,
        };
        match status.class() {
            StatusClass::ServerError => error!("{status}: {self}"),
            _ => warn!("{status}: {self}"),
        }
        Err(status)
    }
}
