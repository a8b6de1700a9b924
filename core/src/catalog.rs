//! The fixed set of remote operations and how each maps onto HTTP.
//!
//! # Design
//! `Operation` is the bare tag: method, path template, whether a JSON body is
//! sent and which payload shape a 200 carries. `Call` pairs a tag with the
//! caller's parameters and derives the query string from them. Neither does
//! any I/O; `RebrandlyClient` turns a `Call` into an `HttpRequest`.

use std::collections::BTreeMap;
use std::fmt;

use crate::http::HttpMethod;
use crate::types::{DomainFilter, LinkFields, LinkFilter, OrderPagination};

pub const DEFAULT_BASE_URL: &str = "https://api.rebrandly.com/";
pub const CONTENT_TYPE: &str = "application/json";
pub const API_KEY_HEADER: &str = "apikey";

/// Placeholder substituted with the path identifier.
const ID_SEGMENT: &str = "{id}";

/// One of the supported remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateLink,
    UpdateLink,
    DeleteLink,
    LinkDetails,
    ListLinks,
    LinkCount,
    DomainDetails,
    DomainList,
    DomainCount,
}

/// Shape of the body of a successful (200) response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Link,
    Links,
    Domain,
    Domains,
    Count,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::CreateLink,
        Operation::UpdateLink,
        Operation::DeleteLink,
        Operation::LinkDetails,
        Operation::ListLinks,
        Operation::LinkCount,
        Operation::DomainDetails,
        Operation::DomainList,
        Operation::DomainCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateLink => "CreateLink",
            Operation::UpdateLink => "UpdateLink",
            Operation::DeleteLink => "DeleteLink",
            Operation::LinkDetails => "LinkDetails",
            Operation::ListLinks => "ListLinks",
            Operation::LinkCount => "LinkCount",
            Operation::DomainDetails => "DomainDetails",
            Operation::DomainList => "DomainList",
            Operation::DomainCount => "DomainCount",
        }
    }

    pub fn method(self) -> HttpMethod {
        match self {
            Operation::CreateLink | Operation::UpdateLink => HttpMethod::Post,
            Operation::DeleteLink => HttpMethod::Delete,
            Operation::LinkDetails
            | Operation::ListLinks
            | Operation::LinkCount
            | Operation::DomainDetails
            | Operation::DomainList
            | Operation::DomainCount => HttpMethod::Get,
        }
    }

    /// Path relative to the API root. `{id}` marks the path identifier.
    pub fn path_template(self) -> &'static str {
        match self {
            Operation::CreateLink | Operation::ListLinks => "/v1/links",
            Operation::UpdateLink | Operation::DeleteLink | Operation::LinkDetails => {
                "/v1/links/{id}"
            }
            Operation::LinkCount => "/v1/links/count",
            Operation::DomainDetails => "/v1/domains/{id}",
            Operation::DomainList => "/v1/domains",
            Operation::DomainCount => "/v1/domains/count",
        }
    }

    pub fn requires_id(self) -> bool {
        self.path_segments().any(|s| s == ID_SEGMENT)
    }

    pub fn carries_body(self) -> bool {
        matches!(self, Operation::CreateLink | Operation::UpdateLink)
    }

    pub fn payload_kind(self) -> PayloadKind {
        match self {
            Operation::CreateLink
            | Operation::UpdateLink
            | Operation::DeleteLink
            | Operation::LinkDetails => PayloadKind::Link,
            Operation::ListLinks => PayloadKind::Links,
            Operation::DomainDetails => PayloadKind::Domain,
            Operation::DomainList => PayloadKind::Domains,
            Operation::LinkCount | Operation::DomainCount => PayloadKind::Count,
        }
    }

    /// Path segments with `id` substituted for the placeholder.
    pub fn resolve_path<'a>(self, id: Option<&'a str>) -> impl Iterator<Item = &'a str> {
        self.path_segments()
            .map(move |segment| match (segment, id) {
                (ID_SEGMENT, Some(id)) => id,
                _ => segment,
            })
    }

    fn path_segments(self) -> impl Iterator<Item = &'static str> {
        self.path_template().trim_start_matches('/').split('/')
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An operation together with the caller's parameters.
#[derive(Debug, Clone, Copy)]
pub enum Call<'a> {
    CreateLink {
        fields: &'a LinkFields,
    },
    UpdateLink {
        id: &'a str,
        fields: &'a LinkFields,
    },
    DeleteLink {
        id: &'a str,
        /// Move to trash (reversible) instead of deleting permanently.
        trash: bool,
    },
    LinkDetails {
        id: &'a str,
    },
    ListLinks {
        filter: &'a LinkFilter,
        page: &'a OrderPagination,
    },
    LinkCount {
        filter: &'a LinkFilter,
    },
    DomainDetails {
        id: &'a str,
    },
    DomainList {
        filter: &'a DomainFilter,
        page: &'a OrderPagination,
    },
    DomainCount {
        filter: &'a DomainFilter,
    },
}

impl<'a> Call<'a> {
    pub fn operation(&self) -> Operation {
        match self {
            Call::CreateLink { .. } => Operation::CreateLink,
            Call::UpdateLink { .. } => Operation::UpdateLink,
            Call::DeleteLink { .. } => Operation::DeleteLink,
            Call::LinkDetails { .. } => Operation::LinkDetails,
            Call::ListLinks { .. } => Operation::ListLinks,
            Call::LinkCount { .. } => Operation::LinkCount,
            Call::DomainDetails { .. } => Operation::DomainDetails,
            Call::DomainList { .. } => Operation::DomainList,
            Call::DomainCount { .. } => Operation::DomainCount,
        }
    }

    pub fn path_id(&self) -> Option<&'a str> {
        match *self {
            Call::UpdateLink { id, .. }
            | Call::DeleteLink { id, .. }
            | Call::LinkDetails { id }
            | Call::DomainDetails { id } => Some(id),
            _ => None,
        }
    }

    /// JSON body payload, for the operations that send one.
    pub fn fields(&self) -> Option<&'a LinkFields> {
        match *self {
            Call::CreateLink { fields } | Call::UpdateLink { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Query parameters, sorted by key. Unset filters are left out entirely.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = BTreeMap::new();
        match *self {
            Call::DeleteLink { trash, .. } => {
                params.insert("trash", trash.to_string());
            }
            Call::ListLinks { filter, page } => {
                // The list endpoint spells the flag the American way, count does not.
                link_filter_params(&mut params, "favorite", filter);
                pagination_params(&mut params, page);
            }
            Call::LinkCount { filter } => link_filter_params(&mut params, "favourite", filter),
            Call::DomainList { filter, page } => {
                domain_filter_params(&mut params, filter);
                pagination_params(&mut params, page);
            }
            Call::DomainCount { filter } => domain_filter_params(&mut params, filter),
            Call::CreateLink { .. }
            | Call::UpdateLink { .. }
            | Call::LinkDetails { .. }
            | Call::DomainDetails { .. } => {}
        }
        params.into_iter().collect()
    }
}

fn link_filter_params(
    params: &mut BTreeMap<&'static str, String>,
    favourite_key: &'static str,
    filter: &LinkFilter,
) {
    params.insert(favourite_key, filter.favourite.to_string());
    if let Some(status) = filter.status {
        params.insert("status", status.as_str().to_string());
    }
    if let Some(domain_id) = filter.domain_id.as_deref().filter(|id| !id.is_empty()) {
        params.insert("domain.id", domain_id.to_string());
    }
}

fn domain_filter_params(params: &mut BTreeMap<&'static str, String>, filter: &DomainFilter) {
    params.insert("active", filter.active.to_string());
    if let Some(domain_type) = filter.domain_type {
        params.insert("type", domain_type.as_str().to_string());
    }
}

fn pagination_params(params: &mut BTreeMap<&'static str, String>, page: &OrderPagination) {
    if !page.order_by.is_empty() {
        params.insert("orderBy", page.order_by.clone());
    }
    if let Some(dir) = page.order_dir.as_query() {
        params.insert("orderDir", dir.to_string());
    }
    if page.limit > 0 {
        params.insert("limit", page.limit.to_string());
    }
    params.insert("offset", page.offset.to_string());
}
