//! Stateless request builder and response classifier for the Rebrandly API.
//!
//! # Design
//! `RebrandlyClient` holds only the API root and carries no state between
//! calls. Every operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`; the
//! convenience methods (`create_link`, `list_links`, ...) chain the two
//! around exactly one `Transport::execute`.
//!
//! Which success shape a 200 carries is decided by the operation tag, never
//! by looking at the JSON. Error statuses map onto `RemoteError`; a status
//! with no documented shape is `ApiError::UnsupportedStatus`.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::catalog::{Call, Operation, PayloadKind, API_KEY_HEADER, CONTENT_TYPE, DEFAULT_BASE_URL};
use crate::error::{
    AlreadyExistsError, ApiError, BadRequestError, ErrorCode, InvalidFormatError, NotFoundError,
    RemoteError, ServerError, UnauthorizedError, ValidationError,
};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Count, Domain, DomainFilter, Link, LinkFields, LinkFilter, OrderPagination};
use crate::validate::{validate_destination, validate_identifier};

/// A decoded successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Link(Link),
    Links(Vec<Link>),
    Domain(Domain),
    Domains(Vec<Domain>),
    Count(Count),
}

/// Synchronous, stateless client for the Rebrandly API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The API key is passed to every call; the client
/// itself holds no credentials.
#[derive(Debug, Clone)]
pub struct RebrandlyClient {
    base_url: String,
}

impl Default for RebrandlyClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl RebrandlyClient {
    /// Target an API root other than the production host, e.g. a mock server.
    ///
    /// The root is parsed when a request is built; a malformed one surfaces
    /// as `ValidationError::InvalidBaseUrl` from every `build_*` call.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: format!("{}/", base_url.trim_end_matches('/')),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    /// Render `call` into a request carrying `api_key`.
    ///
    /// Link payloads are validated first; an invalid destination or an empty
    /// path identifier fails here and nothing is built.
    pub fn build_request(&self, api_key: &str, call: &Call<'_>) -> Result<HttpRequest, ApiError> {
        let operation = call.operation();

        if let Some(fields) = call.fields() {
            validate_destination(&fields.destination)?;
        }
        let id = call.path_id();
        if let Some(id) = id {
            validate_identifier(operation, id)?;
        }

        let url = self.resolve_url(operation, id, &call.query())?;
        let body = call
            .fields()
            .map(|fields| {
                serde_json::to_string(fields).map_err(|e| ApiError::Serialization(e.to_string()))
            })
            .transpose()?;

        let request = HttpRequest {
            method: operation.method(),
            url: url.into(),
            headers: vec![
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
                (API_KEY_HEADER.to_string(), api_key.to_string()),
            ],
            body,
            operation,
        };
        debug!(%operation, method = %request.method, url = %request.url, "built request");
        Ok(request)
    }

    pub fn build_create_link(&self, api_key: &str, fields: &LinkFields) -> Result<HttpRequest, ApiError> {
        self.build_request(api_key, &Call::CreateLink { fields })
    }

    pub fn build_update_link(
        &self,
        api_key: &str,
        id: &str,
        fields: &LinkFields,
    ) -> Result<HttpRequest, ApiError> {
        self.build_request(api_key, &Call::UpdateLink { id, fields })
    }

    pub fn build_delete_link(&self, api_key: &str, id: &str, trash: bool) -> Result<HttpRequest, ApiError> {
        self.build_request(api_key, &Call::DeleteLink { id, trash })
    }

    pub fn build_link_details(&self, api_key: &str, id: &str) -> Result<HttpRequest, ApiError> {
        self.build_request(api_key, &Call::LinkDetails { id })
    }

    pub fn build_list_links(
        &self,
        api_key: &str,
        filter: &LinkFilter,
        page: &OrderPagination,
    ) -> Result<HttpRequest, ApiError> {
        self.build_request(api_key, &Call::ListLinks { filter, page })
    }

    pub fn build_link_count(&self, api_key: &str, filter: &LinkFilter) -> Result<HttpRequest, ApiError> {
        self.build_request(api_key, &Call::LinkCount { filter })
    }

    pub fn build_domain_details(&self, api_key: &str, id: &str) -> Result<HttpRequest, ApiError> {
        self.build_request(api_key, &Call::DomainDetails { id })
    }

    pub fn build_domain_list(
        &self,
        api_key: &str,
        filter: &DomainFilter,
        page: &OrderPagination,
    ) -> Result<HttpRequest, ApiError> {
        self.build_request(api_key, &Call::DomainList { filter, page })
    }

    pub fn build_domain_count(&self, api_key: &str, filter: &DomainFilter) -> Result<HttpRequest, ApiError> {
        self.build_request(api_key, &Call::DomainCount { filter })
    }

    fn resolve_url(
        &self,
        operation: Operation,
        id: Option<&str>,
        query: &[(&'static str, String)],
    ) -> Result<Url, ApiError> {
        let invalid_base = ValidationError::InvalidBaseUrl;
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid_base(e.to_string()))?;
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| invalid_base(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(operation.resolve_path(id));
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    // -----------------------------------------------------------------------
    // Parse
    // -----------------------------------------------------------------------

    pub fn parse_create_link(&self, response: &HttpResponse) -> Result<Link, ApiError> {
        parse(Operation::CreateLink, response)
    }

    pub fn parse_update_link(&self, response: &HttpResponse) -> Result<Link, ApiError> {
        parse(Operation::UpdateLink, response)
    }

    /// The service answers a delete with the deleted (or trashed) link.
    pub fn parse_delete_link(&self, response: &HttpResponse) -> Result<Link, ApiError> {
        parse(Operation::DeleteLink, response)
    }

    pub fn parse_link_details(&self, response: &HttpResponse) -> Result<Link, ApiError> {
        parse(Operation::LinkDetails, response)
    }

    pub fn parse_list_links(&self, response: &HttpResponse) -> Result<Vec<Link>, ApiError> {
        parse(Operation::ListLinks, response)
    }

    pub fn parse_link_count(&self, response: &HttpResponse) -> Result<Count, ApiError> {
        parse(Operation::LinkCount, response)
    }

    pub fn parse_domain_details(&self, response: &HttpResponse) -> Result<Domain, ApiError> {
        parse(Operation::DomainDetails, response)
    }

    pub fn parse_domain_list(&self, response: &HttpResponse) -> Result<Vec<Domain>, ApiError> {
        parse(Operation::DomainList, response)
    }

    pub fn parse_domain_count(&self, response: &HttpResponse) -> Result<Count, ApiError> {
        parse(Operation::DomainCount, response)
    }

    // -----------------------------------------------------------------------
    // Build, execute once, parse
    // -----------------------------------------------------------------------

    /// Run any call through `transport` and classify the answer.
    pub fn execute<T: Transport + ?Sized>(
        &self,
        transport: &T,
        api_key: &str,
        call: &Call<'_>,
    ) -> Result<Payload, ApiError> {
        let request = self.build_request(api_key, call)?;
        let response = transport.execute(&request)?;
        classify(request.operation, &response)
    }

    pub fn create_link<T: Transport + ?Sized>(
        &self,
        transport: &T,
        api_key: &str,
        fields: &LinkFields,
    ) -> Result<Link, ApiError> {
        let request = self.build_create_link(api_key, fields)?;
        self.parse_create_link(&transport.execute(&request)?)
    }

    pub fn update_link<T: Transport + ?Sized>(
        &self,
        transport: &T,
        api_key: &str,
        id: &str,
        fields: &LinkFields,
    ) -> Result<Link, ApiError> {
        let request = self.build_update_link(api_key, id, fields)?;
        self.parse_update_link(&transport.execute(&request)?)
    }

    pub fn delete_link<T: Transport + ?Sized>(
        &self,
        transport: &T,
        api_key: &str,
        id: &str,
        trash: bool,
    ) -> Result<Link, ApiError> {
        let request = self.build_delete_link(api_key, id, trash)?;
        self.parse_delete_link(&transport.execute(&request)?)
    }

    pub fn link_details<T: Transport + ?Sized>(
        &self,
        transport: &T,
        api_key: &str,
        id: &str,
    ) -> Result<Link, ApiError> {
        let request = self.build_link_details(api_key, id)?;
        self.parse_link_details(&transport.execute(&request)?)
    }

    pub fn list_links<T: Transport + ?Sized>(
        &self,
        transport: &T,
        api_key: &str,
        filter: &LinkFilter,
        page: &OrderPagination,
    ) -> Result<Vec<Link>, ApiError> {
        let request = self.build_list_links(api_key, filter, page)?;
        self.parse_list_links(&transport.execute(&request)?)
    }

    pub fn link_count<T: Transport + ?Sized>(
        &self,
        transport: &T,
        api_key: &str,
        filter: &LinkFilter,
    ) -> Result<Count, ApiError> {
        let request = self.build_link_count(api_key, filter)?;
        self.parse_link_count(&transport.execute(&request)?)
    }

    pub fn domain_details<T: Transport + ?Sized>(
        &self,
        transport: &T,
        api_key: &str,
        id: &str,
    ) -> Result<Domain, ApiError> {
        let request = self.build_domain_details(api_key, id)?;
        self.parse_domain_details(&transport.execute(&request)?)
    }

    pub fn domain_list<T: Transport + ?Sized>(
        &self,
        transport: &T,
        api_key: &str,
        filter: &DomainFilter,
        page: &OrderPagination,
    ) -> Result<Vec<Domain>, ApiError> {
        let request = self.build_domain_list(api_key, filter, page)?;
        self.parse_domain_list(&transport.execute(&request)?)
    }

    pub fn domain_count<T: Transport + ?Sized>(
        &self,
        transport: &T,
        api_key: &str,
        filter: &DomainFilter,
    ) -> Result<Count, ApiError> {
        let request = self.build_domain_count(api_key, filter)?;
        self.parse_domain_count(&transport.execute(&request)?)
    }
}

/// Classify a response to `operation` into its success payload or an error.
pub fn classify(operation: Operation, response: &HttpResponse) -> Result<Payload, ApiError> {
    check_status(operation, response)?;
    let body = response.body.as_str();
    let payload = match operation.payload_kind() {
        PayloadKind::Link => Payload::Link(decode(operation, body)?),
        PayloadKind::Links => Payload::Links(decode(operation, body)?),
        PayloadKind::Domain => Payload::Domain(decode(operation, body)?),
        PayloadKind::Domains => Payload::Domains(decode(operation, body)?),
        PayloadKind::Count => Payload::Count(decode(operation, body)?),
    };
    Ok(payload)
}

fn parse<T: DeserializeOwned>(operation: Operation, response: &HttpResponse) -> Result<T, ApiError> {
    check_status(operation, response)?;
    decode(operation, &response.body)
}

/// Map every status other than 200 to its error.
fn check_status(operation: Operation, response: &HttpResponse) -> Result<(), ApiError> {
    let status = response.status;
    let body = response.body.as_str();
    debug!(%operation, status, "classifying response");

    let remote = match status {
        200 => return Ok(()),
        400 => RemoteError::BadRequest(decode::<BadRequestError>(operation, body)?),
        401 if body.trim() == "Unauthorized" => RemoteError::Unauthorized(UnauthorizedError::bare()),
        401 => RemoteError::Unauthorized(decode(operation, body)?),
        403 => forbidden(decode(operation, body)?),
        404 => RemoteError::NotFound(decode::<NotFoundError>(operation, body)?),
        500 | 502 | 503 | 504 => RemoteError::ServerError(decode::<ServerError>(operation, body)?),
        _ => {
            warn!(%operation, status, "unsupported status code");
            return Err(ApiError::UnsupportedStatus {
                status,
                body: body.to_string(),
            });
        }
    };
    Err(remote.into())
}

/// 403 carries either a validation failure or a uniqueness conflict,
/// told apart by `code`.
fn forbidden(error: InvalidFormatError) -> RemoteError {
    if error.code == Some(ErrorCode::AlreadyExists) {
        RemoteError::AlreadyExists(AlreadyExistsError {
            message: error.message,
            code: ErrorCode::AlreadyExists,
            property: error.property,
        })
    } else {
        RemoteError::InvalidFormat(error)
    }
}

fn decode<T: DeserializeOwned>(operation: Operation, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        warn!(%operation, error = %e, "response body does not match the expected shape");
        ApiError::Deserialization(e.to_string())
    })
}
