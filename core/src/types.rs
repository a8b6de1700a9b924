//! Wire types for the Rebrandly REST API.
//!
//! # Design
//! Field names follow the service's camelCase JSON. Response types default
//! every field the service may omit, so a sparse but well-formed body still
//! decodes; request types skip unset optional fields so the service applies
//! its own defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a branded short link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Active,
    /// Soft-deleted; can be restored.
    Trashed,
}

impl LinkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkStatus::Active => "active",
            LinkStatus::Trashed => "trashed",
        }
    }
}

/// Whether a domain is provided by the service or owned by the account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    #[default]
    Service,
    User,
}

impl DomainType {
    pub fn as_str(self) -> &'static str {
        match self {
            DomainType::Service => "service",
            DomainType::User => "user",
        }
    }
}

/// Reference to a branded domain, as embedded in a link.
///
/// On create/update only `id` is needed to pick a branded domain; the service
/// fills in `fullName` (and sometimes `ref`) in its responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "ref", default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_name: String,
}

impl DomainRef {
    pub fn by_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            reference: format!("/domains/{id}"),
            id,
            full_name: String::new(),
        }
    }
}

/// A branded short link returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slashtag: String,
    pub destination: String,
    #[serde(default)]
    pub short_url: String,
    #[serde(default)]
    pub domain: DomainRef,
    #[serde(default)]
    pub status: LinkStatus,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub last_click_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub favourite: bool,
    /// Query parameters on the short URL are passed on to the destination.
    #[serde(default)]
    pub forward_parameters: bool,
}

/// A domain usable for short links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub top_level_domain: String,
    #[serde(rename = "type", default)]
    pub domain_type: DomainType,
    #[serde(default)]
    pub active: bool,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// RFC 3339 timestamps written the way the service writes them: UTC with a
/// `Z` suffix and millisecond precision (`2016-07-13T10:54:12.000Z`).
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<DateTime<Utc>>::deserialize(deserializer)
    }
}

/// Result of the `count` endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub count: u64,
}

/// Request payload for creating or updating a link.
///
/// Server-assigned fields (id, short URL, timestamps, clicks) are not part of
/// the payload. An unset `slashtag` lets the service generate one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkFields {
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slashtag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favourite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_parameters: Option<bool>,
}

impl LinkFields {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..Self::default()
        }
    }

    /// An empty slash-tag is treated as unset.
    pub fn with_slashtag(mut self, slashtag: impl Into<String>) -> Self {
        let slashtag = slashtag.into();
        self.slashtag = (!slashtag.is_empty()).then_some(slashtag);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_domain(mut self, domain_id: impl Into<String>) -> Self {
        self.domain = Some(DomainRef::by_id(domain_id));
        self
    }

    pub fn with_favourite(mut self, favourite: bool) -> Self {
        self.favourite = Some(favourite);
        self
    }

    pub fn with_forward_parameters(mut self, forward: bool) -> Self {
        self.forward_parameters = Some(forward);
        self
    }
}

/// Sort direction for list operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDir {
    Asc,
    Desc,
    /// Leave the choice to the service.
    #[default]
    Unspecified,
}

impl OrderDir {
    pub fn as_query(self) -> Option<&'static str> {
        match self {
            OrderDir::Asc => Some("asc"),
            OrderDir::Desc => Some("desc"),
            OrderDir::Unspecified => None,
        }
    }
}

/// Ordering and paging for list operations.
///
/// `offset` is always sent; `limit == 0` means "service default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPagination {
    pub order_by: String,
    pub order_dir: OrderDir,
    pub offset: u64,
    pub limit: u64,
}

impl OrderPagination {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit,
            ..Self::default()
        }
    }

    pub fn ordered_by(mut self, field: impl Into<String>, dir: OrderDir) -> Self {
        self.order_by = field.into();
        self.order_dir = dir;
        self
    }
}

/// Filters accepted by the link list and count operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFilter {
    pub favourite: bool,
    pub status: Option<LinkStatus>,
    /// Restrict to one branded domain. Empty means no restriction.
    pub domain_id: Option<String>,
}

/// Filters accepted by the domain list and count operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainFilter {
    pub active: bool,
    pub domain_type: Option<DomainType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK_JSON: &str = r#"{
        "id": "ffs0a4b9b9c2",
        "title": "Gophers",
        "slashtag": "burn10M",
        "destination": "https://www.wired.com/2016/07/ferrari/",
        "shortUrl": "rebrand.ly/burn10M",
        "domain": {"id": "8f104cc5b6ee4a4ba7897b06ac2ddcfb", "fullName": "rebrand.ly"},
        "status": "active",
        "createdAt": "2016-07-13T10:54:12.000Z",
        "updatedAt": "2016-07-13T10:54:12.000Z",
        "clicks": 42,
        "lastClickAt": "2016-07-13T10:55:13.000Z",
        "favourite": false,
        "forwardParameters": true
    }"#;

    #[test]
    fn link_decodes_documented_fields() {
        let link: Link = serde_json::from_str(LINK_JSON).unwrap();
        assert_eq!(link.slashtag, "burn10M");
        assert_eq!(link.short_url, "rebrand.ly/burn10M");
        assert_eq!(link.domain.full_name, "rebrand.ly");
        assert_eq!(link.clicks, 42);
        assert!(link.forward_parameters);
        assert_eq!(
            link.last_click_at.unwrap().to_rfc3339(),
            "2016-07-13T10:55:13+00:00"
        );
    }

    #[test]
    fn link_survives_reencoding() {
        let link: Link = serde_json::from_str(LINK_JSON).unwrap();
        let encoded = serde_json::to_string(&link).unwrap();
        let back: Link = serde_json::from_str(&encoded).unwrap();
        assert_eq!(back, link);
    }

    const DOMAIN_JSON: &str = r#"{
        "id": "8f104cc5b6ee4a4ba7897b06ac2ddcfb",
        "fullName": "rebrand.ly",
        "topLevelDomain": "ly",
        "type": "service",
        "active": true,
        "createdAt": "2016-07-01T13:12:22.000Z",
        "updatedAt": "2016-07-03T13:17:50.120Z"
    }"#;

    #[test]
    fn link_encoding_reproduces_the_wire_form() {
        let wire: serde_json::Value = serde_json::from_str(LINK_JSON).unwrap();
        let link: Link = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(serde_json::to_value(&link).unwrap(), wire);
    }

    #[test]
    fn domain_encoding_reproduces_the_wire_form() {
        let wire: serde_json::Value = serde_json::from_str(DOMAIN_JSON).unwrap();
        let domain: Domain = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(serde_json::to_value(&domain).unwrap(), wire);
    }

    #[test]
    fn timestamps_keep_millisecond_precision() {
        let link: Link = serde_json::from_str(
            r#"{"id":"l1","destination":"https://example.com","createdAt":"2016-07-13T10:54:12Z"}"#,
        )
        .unwrap();
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["createdAt"], "2016-07-13T10:54:12.000Z");
        assert!(json.get("updatedAt").is_none());
    }

    #[test]
    fn domain_type_uses_type_key() {
        let domain: Domain = serde_json::from_str(
            r#"{"id":"d1","fullName":"brand.cool","topLevelDomain":"cool","type":"user","active":false}"#,
        )
        .unwrap();
        assert_eq!(domain.domain_type, DomainType::User);
        let json = serde_json::to_value(&domain).unwrap();
        assert_eq!(json["type"], "user");
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn link_fields_skip_unset_values() {
        let fields = LinkFields::new("https://example.com").with_slashtag("");
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json, serde_json::json!({"destination": "https://example.com"}));
    }

    #[test]
    fn link_fields_with_domain_send_reference() {
        let fields = LinkFields::new("https://example.com")
            .with_domain("abc")
            .with_forward_parameters(false);
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["domain"]["id"], "abc");
        assert_eq!(json["domain"]["ref"], "/domains/abc");
        assert_eq!(json["forwardParameters"], false);
    }

    #[test]
    fn unspecified_order_dir_has_no_query_value() {
        assert_eq!(OrderDir::Unspecified.as_query(), None);
        assert_eq!(OrderDir::Desc.as_query(), Some("desc"));
        assert_eq!(OrderPagination::default().offset, 0);
    }
}
