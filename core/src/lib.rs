//! Synchronous client core for the Rebrandly link-shortening API.
//!
//! # Overview
//! Builds `HttpRequest` values and classifies `HttpResponse` values without
//! touching the network (host-does-IO pattern). A `Transport` executes the
//! round-trip; `UreqTransport` is provided behind the default `ureq` feature.
//!
//! # Design
//! - `RebrandlyClient` is stateless: it holds only the API root. The API key
//!   is an argument of every call.
//! - `catalog` is the fixed table of operations; `client` renders calls into
//!   requests and classifies responses by operation and status.
//! - Remote rejections decode into typed `RemoteError` shapes and are kept
//!   apart from local validation and transport failures in `ApiError`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod catalog;
pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;
pub mod validate;

pub use catalog::{Call, Operation, PayloadKind};
pub use client::{classify, Payload, RebrandlyClient};
pub use error::{
    AlreadyExistsError, ApiError, BadRequestError, ErrorCode, FieldError, InvalidFormatError,
    NotFoundError, RemoteError, ServerError, TransportError, UnauthorizedError, ValidationError,
};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    Count, Domain, DomainFilter, DomainRef, DomainType, Link, LinkFields, LinkFilter, LinkStatus,
    OrderDir, OrderPagination,
};
pub use validate::{validate_destination, MAX_DESTINATION_LENGTH};
