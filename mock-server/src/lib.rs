//! In-memory imitation of the Rebrandly REST API.
//!
//! Covers the link and domain endpoints with the service's status codes and
//! error bodies, including the bare-text `Unauthorized` answer for requests
//! without an API key. Boolean filters (`favourite`, `active`) only narrow
//! the result when `true`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// The only key the mock accepts.
pub const API_KEY: &str = "mock-api-key";
pub const DEFAULT_DOMAIN_ID: &str = "8f104cc5b6ee4a4ba7897b06ac2ddcfb";
pub const BRANDED_DOMAIN_ID: &str = "3c8e2a0f5d7b4e1a9c6f0b2d4e8a1c3f";

const MIN_SLASHTAG_LENGTH: usize = 2;
const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRef {
    pub id: String,
    pub full_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub title: String,
    pub slashtag: String,
    pub destination: String,
    pub short_url: String,
    pub domain: DomainRef,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub clicks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_click_at: Option<DateTime<Utc>>,
    pub favourite: bool,
    pub forward_parameters: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub full_name: String,
    pub top_level_domain: String,
    #[serde(rename = "type")]
    pub domain_type: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct DomainInput {
    pub id: String,
}

/// Body of create and update requests. Every field is optional on the wire;
/// create enforces `destination` itself.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInput {
    pub destination: Option<String>,
    pub slashtag: Option<String>,
    pub title: Option<String>,
    pub domain: Option<DomainInput>,
    pub favourite: Option<bool>,
    pub forward_parameters: Option<bool>,
}

#[derive(Debug)]
pub struct Store {
    links: Vec<Link>,
    domains: Vec<Domain>,
}

impl Store {
    fn seeded() -> Self {
        let now = Utc::now();
        let domain = |id: &str, full_name: &str, tld: &str, domain_type: &str, active: bool| Domain {
            id: id.to_string(),
            full_name: full_name.to_string(),
            top_level_domain: tld.to_string(),
            domain_type: domain_type.to_string(),
            active,
            created_at: now,
            updated_at: now,
        };
        Self {
            links: Vec::new(),
            domains: vec![
                domain(DEFAULT_DOMAIN_ID, "rebrand.ly", "ly", "service", true),
                domain(BRANDED_DOMAIN_ID, "brand.cool", "cool", "user", false),
            ],
        }
    }

    fn domain(&self, id: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.id == id)
    }

    fn slashtag_taken(&self, domain_id: &str, slashtag: &str, except: Option<&str>) -> bool {
        self.links.iter().any(|l| {
            l.domain.id == domain_id && l.slashtag == slashtag && Some(l.id.as_str()) != except
        })
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error answers, shaped like the service's.
#[derive(Debug)]
pub enum MockError {
    BadRequest(String),
    InvalidFormat(Value),
    AlreadyExists { property: &'static str },
    NotFound { property: &'static str, source: &'static str, id: String },
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        match self {
            MockError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            MockError::InvalidFormat(body) => (StatusCode::FORBIDDEN, Json(body)).into_response(),
            MockError::AlreadyExists { property } => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "property": property,
                    "message": "Already exists",
                    "code": "AlreadyExists",
                })),
            )
                .into_response(),
            MockError::NotFound { property, source, id } => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "property": property,
                    "message": "Not found",
                    "code": "NotFound",
                    "source": source,
                    "id": id,
                })),
            )
                .into_response(),
        }
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/v1/links", get(list_links).post(create_link))
        .route("/v1/links/count", get(count_links))
        .route(
            "/v1/links/{id}",
            get(get_link).post(update_link).delete(delete_link),
        )
        .route("/v1/domains", get(list_domains))
        .route("/v1/domains/count", get(count_domains))
        .route("/v1/domains/{id}", get(get_domain))
        .layer(middleware::from_fn(require_api_key))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_api_key(request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get("apikey")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if key.is_empty() {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    if key != API_KEY {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": "Unauthorized", "message": "Invalid API key" })),
        )
            .into_response();
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

async fn create_link(
    State(db): State<Db>,
    input: Result<Json<LinkInput>, JsonRejection>,
) -> Result<Json<Link>, MockError> {
    let Json(input) = input.map_err(|e| MockError::BadRequest(e.body_text()))?;
    let destination = input
        .destination
        .filter(|d| !d.is_empty())
        .ok_or_else(|| required_field("destination"))?;

    let mut store = db.write().await;
    let domain_id = input
        .domain
        .map(|d| d.id)
        .unwrap_or_else(|| DEFAULT_DOMAIN_ID.to_string());
    let domain = store.domain(&domain_id).cloned().ok_or(MockError::NotFound {
        property: "domain.id",
        source: "domain",
        id: domain_id.clone(),
    })?;

    let slashtag = match input.slashtag.filter(|s| !s.is_empty()) {
        Some(slashtag) => {
            check_slashtag(&slashtag)?;
            if store.slashtag_taken(&domain.id, &slashtag, None) {
                return Err(MockError::AlreadyExists {
                    property: "slashtag",
                });
            }
            slashtag
        }
        None => Uuid::new_v4().simple().to_string().chars().take(7).collect(),
    };

    let now = Utc::now();
    let link = Link {
        id: Uuid::new_v4().simple().to_string(),
        title: input.title.unwrap_or_default(),
        short_url: format!("{}/{}", domain.full_name, slashtag),
        slashtag,
        destination,
        domain: DomainRef {
            id: domain.id,
            full_name: domain.full_name,
        },
        status: "active".to_string(),
        created_at: now,
        updated_at: now,
        clicks: 0,
        last_click_at: None,
        favourite: input.favourite.unwrap_or(false),
        forward_parameters: input.forward_parameters.unwrap_or(true),
    };
    tracing::info!(id = %link.id, slashtag = %link.slashtag, "link created");
    store.links.push(link.clone());
    Ok(Json(link))
}

async fn update_link(
    State(db): State<Db>,
    Path(id): Path<String>,
    input: Result<Json<LinkInput>, JsonRejection>,
) -> Result<Json<Link>, MockError> {
    let Json(input) = input.map_err(|e| MockError::BadRequest(e.body_text()))?;
    let mut store = db.write().await;
    let current = store
        .links
        .iter()
        .find(|l| l.id == id)
        .cloned()
        .ok_or_else(|| link_not_found(&id))?;

    if let Some(slashtag) = input
        .slashtag
        .as_deref()
        .filter(|s| !s.is_empty() && *s != current.slashtag)
    {
        check_slashtag(slashtag)?;
        if store.slashtag_taken(&current.domain.id, slashtag, Some(&id)) {
            return Err(MockError::AlreadyExists {
                property: "slashtag",
            });
        }
    }
    if input.destination.as_deref() == Some("") {
        return Err(required_field("destination"));
    }

    let link = store
        .links
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or_else(|| link_not_found(&id))?;
    if let Some(destination) = input.destination {
        link.destination = destination;
    }
    if let Some(slashtag) = input.slashtag.filter(|s| !s.is_empty()) {
        link.short_url = format!("{}/{}", link.domain.full_name, slashtag);
        link.slashtag = slashtag;
    }
    if let Some(title) = input.title {
        link.title = title;
    }
    if let Some(favourite) = input.favourite {
        link.favourite = favourite;
    }
    if let Some(forward) = input.forward_parameters {
        link.forward_parameters = forward;
    }
    link.updated_at = Utc::now();
    Ok(Json(link.clone()))
}

async fn get_link(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Link>, MockError> {
    let store = db.read().await;
    store
        .links
        .iter()
        .find(|l| l.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| link_not_found(&id))
}

async fn delete_link(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Link>, MockError> {
    let mut store = db.write().await;
    let position = store
        .links
        .iter()
        .position(|l| l.id == id)
        .ok_or_else(|| link_not_found(&id))?;

    if flag(&params, "trash") {
        let link = &mut store.links[position];
        link.status = "trashed".to_string();
        link.updated_at = Utc::now();
        Ok(Json(link.clone()))
    } else {
        tracing::info!(%id, "link deleted");
        Ok(Json(store.links.remove(position)))
    }
}

async fn list_links(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Link>>, MockError> {
    let store = db.read().await;
    let mut links: Vec<Link> = store
        .links
        .iter()
        .filter(|l| link_matches(l, &params, "favorite"))
        .cloned()
        .collect();
    if params.get("orderBy").map(String::as_str) == Some("slashtag") {
        links.sort_by(|a, b| a.slashtag.cmp(&b.slashtag));
    }
    if params.get("orderDir").map(String::as_str) == Some("desc") {
        links.reverse();
    }
    Ok(Json(paginate(links, &params)?))
}

async fn count_links(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let store = db.read().await;
    let count = store
        .links
        .iter()
        .filter(|l| link_matches(l, &params, "favourite"))
        .count();
    Json(json!({ "count": count }))
}

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

async fn list_domains(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Domain>>, MockError> {
    let store = db.read().await;
    let mut domains: Vec<Domain> = store
        .domains
        .iter()
        .filter(|d| domain_matches(d, &params))
        .cloned()
        .collect();
    if params.get("orderBy").map(String::as_str) == Some("fullName") {
        domains.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    }
    if params.get("orderDir").map(String::as_str) == Some("desc") {
        domains.reverse();
    }
    Ok(Json(paginate(domains, &params)?))
}

async fn count_domains(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let store = db.read().await;
    let count = store
        .domains
        .iter()
        .filter(|d| domain_matches(d, &params))
        .count();
    Json(json!({ "count": count }))
}

async fn get_domain(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Domain>, MockError> {
    let store = db.read().await;
    store.domain(&id).cloned().map(Json).ok_or(MockError::NotFound {
        property: "id",
        source: "domain",
        id,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn flag(params: &HashMap<String, String>, key: &str) -> bool {
    params.get(key).map(String::as_str) == Some("true")
}

fn link_matches(link: &Link, params: &HashMap<String, String>, favourite_key: &str) -> bool {
    if flag(params, favourite_key) && !link.favourite {
        return false;
    }
    if params.get("status").is_some_and(|s| *s != link.status) {
        return false;
    }
    !params.get("domain.id").is_some_and(|id| *id != link.domain.id)
}

fn domain_matches(domain: &Domain, params: &HashMap<String, String>) -> bool {
    if flag(params, "active") && !domain.active {
        return false;
    }
    !params.get("type").is_some_and(|t| *t != domain.domain_type)
}

fn paginate<T>(items: Vec<T>, params: &HashMap<String, String>) -> Result<Vec<T>, MockError> {
    let offset = numeric(params, "offset")?.unwrap_or(0);
    let limit = numeric(params, "limit")?.unwrap_or(DEFAULT_LIST_LIMIT);
    Ok(items.into_iter().skip(offset).take(limit).collect())
}

fn numeric(params: &HashMap<String, String>, key: &'static str) -> Result<Option<usize>, MockError> {
    params
        .get(key)
        .map(|raw| {
            raw.parse().map_err(|_| {
                MockError::InvalidFormat(json!({
                    "property": key,
                    "message": "Value is not a number",
                    "code": "InvalidFormat",
                    "input": raw,
                }))
            })
        })
        .transpose()
}

fn check_slashtag(slashtag: &str) -> Result<(), MockError> {
    if slashtag.chars().count() < MIN_SLASHTAG_LENGTH {
        return Err(MockError::InvalidFormat(json!({
            "property": "slashtag",
            "message": "Value cannot be less than 2 characters long",
            "code": "InvalidMinLength",
            "input": slashtag,
            "minLength": MIN_SLASHTAG_LENGTH,
        })));
    }
    Ok(())
}

fn required_field(property: &'static str) -> MockError {
    MockError::InvalidFormat(json!({
        "code": "RequiredField",
        "message": "Cannot be empty",
        "property": property,
    }))
}

fn link_not_found(id: &str) -> MockError {
    MockError::NotFound {
        property: "id",
        source: "link",
        id: id.to_string(),
    }
}
