//! Verify request building and response classification against the JSON
//! vectors stored in `test-vectors/`.
//!
//! `requests.json` pairs call parameters with the request they must produce;
//! `responses.json` pairs a status and body with the outcome `classify` must
//! report. Bodies are compared as parsed JSON so key order does not matter.

use rebrandly_core::{
    classify, AlreadyExistsError, ApiError, BadRequestError, Call, Count, Domain, DomainFilter,
    DomainType, HttpMethod, HttpResponse, InvalidFormatError, Link, LinkFields, LinkFilter,
    LinkStatus, NotFoundError, Operation, OrderDir, OrderPagination, Payload, RebrandlyClient,
    RemoteError, ServerError, UnauthorizedError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

const KEY: &str = "vector-key";

fn operation(name: &str) -> Operation {
    Operation::ALL
        .into_iter()
        .find(|op| op.name() == name)
        .unwrap_or_else(|| panic!("unknown operation: {name}"))
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn from_value<T: DeserializeOwned>(value: &Value) -> T {
    serde_json::from_value(value.clone()).unwrap()
}

fn optional<T: DeserializeOwned>(value: &Value) -> Option<T> {
    if value.is_null() {
        None
    } else {
        Some(from_value(value))
    }
}

fn link_filter(value: &Value) -> LinkFilter {
    LinkFilter {
        favourite: value["favourite"].as_bool().unwrap_or_default(),
        status: optional::<LinkStatus>(&value["status"]),
        domain_id: optional(&value["domain_id"]),
    }
}

fn domain_filter(value: &Value) -> DomainFilter {
    DomainFilter {
        active: value["active"].as_bool().unwrap_or_default(),
        domain_type: optional::<DomainType>(&value["type"]),
    }
}

fn page(value: &Value) -> OrderPagination {
    if value.is_null() {
        return OrderPagination::default();
    }
    OrderPagination {
        order_by: value["order_by"].as_str().unwrap_or_default().to_string(),
        order_dir: optional::<OrderDir>(&value["order_dir"]).unwrap_or_default(),
        offset: value["offset"].as_u64().unwrap_or_default(),
        limit: value["limit"].as_u64().unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let base_url = vectors["base_url"].as_str().unwrap();
    let client = RebrandlyClient::new(base_url);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let op = operation(case["operation"].as_str().unwrap());
        let id = case["id"].as_str().unwrap_or_default();
        let fields: LinkFields = optional(&case["fields"]).unwrap_or_default();
        let links = link_filter(&case["link_filter"]);
        let domains = domain_filter(&case["domain_filter"]);
        let page = page(&case["page"]);

        let call = match op {
            Operation::CreateLink => Call::CreateLink { fields: &fields },
            Operation::UpdateLink => Call::UpdateLink { id, fields: &fields },
            Operation::DeleteLink => Call::DeleteLink {
                id,
                trash: case["trash"].as_bool().unwrap(),
            },
            Operation::LinkDetails => Call::LinkDetails { id },
            Operation::ListLinks => Call::ListLinks {
                filter: &links,
                page: &page,
            },
            Operation::LinkCount => Call::LinkCount { filter: &links },
            Operation::DomainDetails => Call::DomainDetails { id },
            Operation::DomainList => Call::DomainList {
                filter: &domains,
                page: &page,
            },
            Operation::DomainCount => Call::DomainCount { filter: &domains },
        };

        let expected = &case["expected_request"];
        let req = client.build_request(KEY, &call).unwrap();
        assert_eq!(req.operation, op, "{name}: operation");
        assert_eq!(
            req.method,
            parse_method(expected["method"].as_str().unwrap()),
            "{name}: method"
        );
        assert_eq!(
            req.url,
            format!("{base_url}{}", expected["path"].as_str().unwrap()),
            "{name}: url"
        );
        assert_eq!(
            req.headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("apikey".to_string(), KEY.to_string()),
            ],
            "{name}: headers"
        );

        match req.body.as_deref() {
            Some(body) => {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected["body"], "{name}: body");
            }
            None => assert!(expected["body"].is_null(), "{name}: missing body"),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn assert_payload(name: &str, kind: &str, value: &Value, payload: Payload) {
    match (kind, payload) {
        ("Link", Payload::Link(link)) => {
            assert_eq!(link, from_value::<Link>(value), "{name}");
            assert_eq!(&serde_json::to_value(&link).unwrap(), value, "{name}: re-encoded");
        }
        ("Links", Payload::Links(links)) => {
            assert_eq!(links, from_value::<Vec<Link>>(value), "{name}")
        }
        ("Domain", Payload::Domain(domain)) => {
            assert_eq!(domain, from_value::<Domain>(value), "{name}");
            assert_eq!(&serde_json::to_value(&domain).unwrap(), value, "{name}: re-encoded");
        }
        ("Domains", Payload::Domains(domains)) => {
            assert_eq!(domains, from_value::<Vec<Domain>>(value), "{name}")
        }
        ("Count", Payload::Count(count)) => assert_eq!(count, from_value::<Count>(value), "{name}"),
        (kind, payload) => panic!("{name}: expected {kind}, got {payload:?}"),
    }
}

fn assert_error(name: &str, kind: &str, value: &Value, err: ApiError) {
    let expected = match kind {
        "UnsupportedStatus" => {
            assert!(matches!(err, ApiError::UnsupportedStatus { .. }), "{name}: {err:?}");
            return;
        }
        "Deserialization" => {
            assert!(matches!(err, ApiError::Deserialization(_)), "{name}: {err:?}");
            return;
        }
        "BadRequest" => RemoteError::BadRequest(from_value::<BadRequestError>(value)),
        "Unauthorized" => RemoteError::Unauthorized(from_value::<UnauthorizedError>(value)),
        "InvalidFormat" => RemoteError::InvalidFormat(from_value::<InvalidFormatError>(value)),
        "AlreadyExists" => RemoteError::AlreadyExists(from_value::<AlreadyExistsError>(value)),
        "NotFound" => RemoteError::NotFound(from_value::<NotFoundError>(value)),
        "ServerError" => RemoteError::ServerError(from_value::<ServerError>(value)),
        other => panic!("{name}: unknown expected kind {other}"),
    };
    assert!(err.is_remote(), "{name}: {err:?}");
    assert_eq!(err, ApiError::Remote(expected), "{name}");
}

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let op = operation(case["operation"].as_str().unwrap());
        let response = HttpResponse::new(
            case["status"].as_u64().unwrap() as u16,
            case["body"].as_str().unwrap(),
        );
        let kind = case["expected"]["kind"].as_str().unwrap();
        let value = &case["expected"]["value"];

        match classify(op, &response) {
            Ok(payload) => assert_payload(name, kind, value, payload),
            Err(err) => assert_error(name, kind, value, err),
        }
    }
}
