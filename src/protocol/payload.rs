//! Input structs for the POST operations.
//!
//! Each payload lists the keys it requires; presence is checked on the raw
//! JSON object before serde sees it so an absent key is reported as
//! `MissingKey` rather than a generic decode failure. Values that are present
//! but null or empty are left for the catalog components to reject.

use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Deserializer};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub trait RequestPayload: DeserializeOwned {
    /// Keys that must be present on the root object (values may be null).
    const REQUIRED_KEYS: &'static [&'static str];
}

/// Body of `POST /specification`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecificationPayload {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl RequestPayload for SpecificationPayload {
    const REQUIRED_KEYS: &'static [&'static str] = &["name", "version"];
}

/// Body of `POST /resource`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourcePayload {
    #[serde(rename = "specName")]
    pub spec_name: Option<String>,
    #[serde(rename = "specVersion")]
    pub spec_version: Option<String>,
    pub url: Option<String>,
}

impl RequestPayload for ResourcePayload {
    const REQUIRED_KEYS: &'static [&'static str] = &["specName", "specVersion", "url"];
}

/// Body of `POST /element`.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementPayload {
    pub resource_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub element_type: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(rename = "static", default = "default_true")]
    pub is_static: bool,
    /// Outer `None` when the key is absent; `Some(None)` for an explicit null,
    /// which is rejected rather than read as "no parent".
    #[serde(default, deserialize_with = "present")]
    pub parent_id: Option<Option<String>>,
}

impl RequestPayload for ElementPayload {
    const REQUIRED_KEYS: &'static [&'static str] = &["resource_id", "type"];
}

fn default_true() -> bool {
    true
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Decode a request body into `T`.
///
/// The root must be a JSON object; every key in `T::REQUIRED_KEYS` must be
/// present. Unknown keys are ignored.
pub fn parse_payload<T: RequestPayload>(body: &[u8]) -> CatalogResult<T> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| CatalogError::validation("Invalid JSON post data"))?;
    let Value::Object(map) = value else {
        return Err(CatalogError::validation(
            "Root of JSON must be an type object",
        ));
    };
    if let Some(missing) = T::REQUIRED_KEYS.iter().find(|key| !map.contains_key(**key)) {
        return Err(CatalogError::missing_key(*missing));
    }
    serde_json::from_value(Value::Object(map))
        .map_err(|err| CatalogError::validation(format!("Malformed payload: {err}")))
}

/// Unwrap a present-but-possibly-null text value, rejecting null and empty.
pub(crate) fn require_text(value: Option<String>, key: &str) -> CatalogResult<String> {
    match value {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(CatalogError::validation(format!(
            "{key} cannot be null or empty"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn rejects_invalid_json_and_non_object_roots() {
        let err = parse_payload::<SpecificationPayload>(b"{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Invalid JSON post data");

        let bodies: [&[u8]; 4] = [b"[]", b"\"config\"", b"42", b"null"];
        for body in bodies {
            let err = parse_payload::<SpecificationPayload>(body).unwrap_err();
            assert_eq!(err.to_string(), "Root of JSON must be an type object");
        }
    }

    #[test]
    fn reports_first_missing_key() {
        let err = parse_payload::<ResourcePayload>(br#"{"specName": "config"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingKey);
        assert_eq!(err.to_string(), "Missing required key: 'specVersion'");
    }

    #[test]
    fn null_required_value_is_present() {
        let payload =
            parse_payload::<SpecificationPayload>(br#"{"name": null, "version": "v1"}"#).unwrap();
        assert_eq!(payload.name, None);
        let err = require_text(payload.name, "name").unwrap_err();
        assert_eq!(err.to_string(), "name cannot be null or empty");
    }

    #[test]
    fn element_flags_default_to_true() {
        let payload = parse_payload::<ElementPayload>(
            br#"{"resource_id": "abc", "type": "string", "extra": 1}"#,
        )
        .unwrap();
        assert!(payload.required);
        assert!(payload.is_static);
        assert_eq!(payload.name, None);
        assert_eq!(payload.parent_id, None);
    }

    #[test]
    fn explicit_null_parent_is_kept_apart_from_absent() {
        let payload = parse_payload::<ElementPayload>(
            br#"{"resource_id": "abc", "type": "string", "parent_id": null}"#,
        )
        .unwrap();
        assert_eq!(payload.parent_id, Some(None));
    }

    #[test]
    fn element_flags_must_be_booleans() {
        let err = parse_payload::<ElementPayload>(
            br#"{"resource_id": "abc", "type": "string", "required": "yes"}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().starts_with("Malformed payload"));
    }

    #[test]
    fn element_requires_type_key() {
        let err =
            parse_payload::<ElementPayload>(br#"{"resource_id": "abc", "name": "x"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Missing required key: 'type'");
    }
}
