//! Content-derived identifiers for catalog entities.
//!
//! Specification and Resource ids are digests of their semantic key;
//! Element ids are digests of their full attribute key (name, type, owning
//! resource and optional parent). Every id is the first 128 bits of a SHA-256
//! digest rendered as 32 lowercase hex characters, which is the id format
//! carried in URLs such as `/resources/{id}/elements`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length in bytes of the truncated digest backing every id.
const ID_BYTES: usize = 16;

// Separates element key fields so ("ab", "c") and ("a", "bc") cannot collide.
const FIELD_SEPARATOR: u8 = 0x1f;

const NAME_ABSENT: u8 = 0x00;
const NAME_PRESENT: u8 = 0x01;

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

catalog_id!(
    /// Digest of `name ++ version`.
    SpecificationId
);
catalog_id!(
    /// Digest of `url ++ specificationId`.
    ResourceId
);
catalog_id!(
    /// Digest of an element's name, type, resource and parent.
    ElementId
);

/// Derive the id of a Specification from its `(name, version)` key.
pub fn specification_id(name: &str, version: &str) -> SpecificationId {
    SpecificationId(digest_concat(&[name.as_bytes(), version.as_bytes()]))
}

/// Derive the id of a Resource from its url and owning Specification.
pub fn resource_id(url: &str, specification: &SpecificationId) -> ResourceId {
    ResourceId(digest_concat(&[url.as_bytes(), specification.0.as_bytes()]))
}

/// Derive the id of an Element.
///
/// The name is prefixed with a presence tag so an unnamed element and one
/// named `""` get different ids; the parent id participates only when
/// present.
pub fn element_id(
    name: Option<&str>,
    element_type: &str,
    resource: &ResourceId,
    parent: Option<&ElementId>,
) -> ElementId {
    let mut hasher = Sha256::new();
    match name {
        Some(name) => {
            hasher.update([NAME_PRESENT]);
            hasher.update(name.as_bytes());
        }
        None => hasher.update([NAME_ABSENT]),
    }
    hasher.update([FIELD_SEPARATOR]);
    hasher.update(element_type.as_bytes());
    hasher.update([FIELD_SEPARATOR]);
    hasher.update(resource.0.as_bytes());
    if let Some(parent) = parent {
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(parent.0.as_bytes());
    }
    ElementId(truncated_hex(hasher))
}

fn digest_concat(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    truncated_hex(hasher)
}

fn truncated_hex(hasher: Sha256) -> String {
    let digest = hasher.finalize();
    hex::encode(&digest[..ID_BYTES])
}

/// True when `value` has the shape of a catalog id (32 lowercase hex chars).
pub fn is_well_formed_id(value: &str) -> bool {
    value.len() == ID_BYTES * 2
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, 'a'..='f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specification_id_is_deterministic() {
        let first = specification_id("config", "v1");
        let second = specification_id("config", "v1");
        assert_eq!(first, second);
        assert!(is_well_formed_id(first.as_str()));
    }

    #[test]
    fn changing_either_key_field_changes_the_id() {
        let base = specification_id("config", "v1");
        assert_ne!(base, specification_id("config", "v2"));
        assert_ne!(base, specification_id("configs", "v1"));
    }

    #[test]
    fn specification_id_hashes_the_plain_concatenation() {
        // The key is `name ++ version`, so shifting characters across the
        // boundary addresses the same specification.
        assert_eq!(
            specification_id("config", "v1"),
            specification_id("configv", "1")
        );
    }

    #[test]
    fn resource_id_depends_on_owning_specification() {
        let v1 = specification_id("config", "v1");
        let v2 = specification_id("config", "v2");
        let a = resource_id("config/first", &v1);
        let b = resource_id("config/first", &v2);
        assert_ne!(a, b);
        assert_eq!(a, resource_id("config/first", &v1));
        assert!(is_well_formed_id(a.as_str()));
    }

    #[test]
    fn element_id_covers_type_and_parent() {
        let resource = resource_id("config/first", &specification_id("config", "v1"));
        let root = element_id(Some("parent"), "object", &resource, None);
        assert_ne!(root, element_id(Some("parent"), "string", &resource, None));
        assert_ne!(
            root,
            element_id(Some("parent"), "object", &resource, Some(&root))
        );
        assert_eq!(root, element_id(Some("parent"), "object", &resource, None));
    }

    #[test]
    fn element_key_fields_do_not_bleed_into_each_other() {
        let resource = ResourceId::from("00000000000000000000000000000000");
        assert_ne!(
            element_id(Some("ab"), "c", &resource, None),
            element_id(Some("a"), "bc", &resource, None)
        );
    }

    #[test]
    fn unnamed_element_differs_from_empty_name() {
        let resource = ResourceId::from("00000000000000000000000000000000");
        assert_ne!(
            element_id(None, "string", &resource, None),
            element_id(Some(""), "string", &resource, None)
        );
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = specification_id("config", "v1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_str()));
        let back: SpecificationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(!is_well_formed_id("abc"));
        assert!(!is_well_formed_id("ZZ000000000000000000000000000000"));
        assert!(is_well_formed_id("0123456789abcdef0123456789abcdef"));
    }
}
