//! Error taxonomy shared by the catalog components and the request protocol.
//!
//! Components return [`CatalogError`] without request context. The protocol
//! layer attaches the offending path and method (see
//! [`crate::protocol::RequestFailure`]) and picks a status code from the
//! [`ErrorKind`] tag instead of inspecting messages.

use thiserror::Error;

/// Failure raised by a [`crate::store::CatalogStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store connection is closed")]
    Closed,
}

/// Field-less tag used to map failures onto status codes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Validation,
    MissingKey,
    NotFound,
    EmptyResult,
    Internal,
}

impl ErrorKind {
    /// HTTP status the transport renders for this kind.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::Validation | ErrorKind::MissingKey => 400,
            ErrorKind::NotFound | ErrorKind::EmptyResult => 404,
            ErrorKind::Internal => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed input: empty name/version, wrong JSON shape, wrong method.
    #[error("{0}")]
    Validation(String),

    /// A key the operation requires is absent from the payload.
    #[error("Missing required key: '{0}'")]
    MissingKey(String),

    /// A referenced Specification, Resource, Element or parent does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A listing matched zero rows where at least one was expected.
    #[error("{0}")]
    EmptyResult(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::Validation(message.into())
    }

    pub fn missing_key(key: impl Into<String>) -> Self {
        CatalogError::MissingKey(key.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CatalogError::NotFound(message.into())
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        CatalogError::EmptyResult(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation(_) => ErrorKind::Validation,
            CatalogError::MissingKey(_) => ErrorKind::MissingKey,
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::EmptyResult(_) => ErrorKind::EmptyResult,
            CatalogError::Store(_) | CatalogError::Encode(_) => ErrorKind::Internal,
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
