//! Error types for the Rebrandly client.
//!
//! # Design
//! Three families are kept apart so a caller can always tell them apart:
//!
//! - `ValidationError`: the request was rejected locally and never sent.
//! - `RemoteError`: the service answered with one of its documented error
//!   bodies. These are data, decoded into typed shapes.
//! - Everything else in `ApiError` (`Transport`, `UnsupportedStatus`,
//!   `Deserialization`, `Serialization`): the exchange itself failed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::catalog::Operation;

/// Errors detected before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("destination cannot be empty")]
    EmptyDestination,

    #[error("destination is {length} characters long, the limit is {max}")]
    DestinationTooLong { length: usize, max: usize },

    #[error("destination is not a valid URL: {0}")]
    InvalidDestination(String),

    #[error("{operation} requires a non-empty identifier")]
    EmptyIdentifier { operation: Operation },

    #[error("{operation} cannot address {id:?}")]
    InvalidIdentifier { operation: Operation, id: String },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Machine-readable error codes used by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Unauthorized,
    InvalidFormat,
    RequiredField,
    InvalidLength,
    InvalidMinLength,
    InvalidMaxLength,
    InvalidEmailAddress,
    OutOfRange,
    PatternMismatch,
    PrefixMismatch,
    InvalidCharacter,
    MustBeLowerCase,
    MustBeUpperCase,
    AlreadyExists,
    NotFound,
    /// A code this client does not know about.
    #[serde(other)]
    Other,
}

/// 400: the request body was not valid JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct BadRequestError {
    #[serde(default, alias = "Message")]
    pub message: String,
}

/// 401: missing or rejected API key.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct UnauthorizedError {
    #[serde(default)]
    pub message: String,
    #[serde(default = "unauthorized_code")]
    pub code: ErrorCode,
}

fn unauthorized_code() -> ErrorCode {
    ErrorCode::Unauthorized
}

impl UnauthorizedError {
    /// The service sometimes answers 401 with the bare text `Unauthorized`.
    pub fn bare() -> Self {
        Self {
            message: "Unauthorized".to_string(),
            code: ErrorCode::Unauthorized,
        }
    }
}

/// One entry of the nested `errors` list of an `InvalidFormatError`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

/// 403: a request property failed the service's validation.
///
/// Only `message` is always present; the remaining fields depend on `code`
/// (e.g. `minLength` accompanies `InvalidMinLength`, `range` accompanies
/// `OutOfRange`).
#[derive(Debug, Clone, Default, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct InvalidFormatError {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub range: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// 403 with code `AlreadyExists`: another resource has the same attributes.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AlreadyExistsError {
    #[serde(default)]
    pub message: String,
    #[serde(default = "already_exists_code")]
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

fn already_exists_code() -> ErrorCode {
    ErrorCode::AlreadyExists
}

/// 404: the addressed resource does not exist.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct NotFoundError {
    #[serde(default)]
    pub message: String,
    #[serde(default = "not_found_code")]
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Kind of resource that was looked up; undocumented by the service.
    #[serde(rename = "source", default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Undocumented; observed as both strings and numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

fn not_found_code() -> ErrorCode {
    ErrorCode::NotFound
}

/// 500, 502, 503 or 504.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ServerError {
    #[serde(default)]
    pub message: String,
}

/// A documented error answer from the service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    #[error("bad request: {0}")]
    BadRequest(BadRequestError),

    #[error("unauthorized: {0}")]
    Unauthorized(UnauthorizedError),

    #[error("invalid format: {0}")]
    InvalidFormat(InvalidFormatError),

    #[error("already exists: {0}")]
    AlreadyExists(AlreadyExistsError),

    #[error("not found: {0}")]
    NotFound(NotFoundError),

    #[error("server error: {0}")]
    ServerError(ServerError),
}

impl RemoteError {
    pub fn message(&self) -> &str {
        match self {
            RemoteError::BadRequest(e) => &e.message,
            RemoteError::Unauthorized(e) => &e.message,
            RemoteError::InvalidFormat(e) => &e.message,
            RemoteError::AlreadyExists(e) => &e.message,
            RemoteError::NotFound(e) => &e.message,
            RemoteError::ServerError(e) => &e.message,
        }
    }
}

/// The transport could not produce a response (connection, TLS, I/O).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failed: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors returned by `RebrandlyClient`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Rejected locally; nothing was sent.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The service answered with a documented error body.
    #[error("{0}")]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service answered with a status this client has no shape for.
    #[error("unsupported status code: {status}")]
    UnsupportedStatus { status: u16, body: String },

    /// The response body did not match the shape implied by its status.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// True when the service itself rejected the request.
    pub fn is_remote(&self) -> bool {
        matches!(self, ApiError::Remote(_))
    }

    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            ApiError::Remote(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_remote(self) -> Option<RemoteError> {
        match self {
            ApiError::Remote(e) => Some(e),
            _ => None,
        }
    }
}
