//! Catalog entities and the JSON shapes they are rendered as.
//!
//! Entities (`Specification`, `Resource`, `Element`) are what the store
//! persists. Views (`ResourceView`, `ElementView`, `ElementEntry`,
//! `IndexEntry`) are the wire contract; their field names are fixed and
//! clients depend on them exactly.

use crate::catalog::identity::{ElementId, ResourceId, SpecificationId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named, versioned API description. Serializes as `{id, name, version}`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub id: SpecificationId,
    pub name: String,
    pub version: String,
}

/// A URL-addressable endpoint owned by one Specification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub url: String,
    pub specification_id: SpecificationId,
}

/// A typed field describing part of a Resource's payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub name: Option<String>,
    pub element_type: String,
    pub is_required: bool,
    pub is_static: bool,
    pub resource_id: ResourceId,
    pub parent_id: Option<ElementId>,
}

/// Relative path clients follow to discover a resource's element tree.
pub fn elements_href(resource: &ResourceId) -> String {
    format!("/resources/{}/elements", resource.as_str())
}

/// Wire shape for resource creation, lookup and listing.
///
/// `specName`, `specVersion` and `elementsHref` are denormalized from the
/// owning specification and the id; none of them are stored.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub id: ResourceId,
    pub url: String,
    pub spec_name: String,
    pub spec_version: String,
    pub elements_href: String,
}

impl ResourceView {
    pub fn new(resource: &Resource, specification: &Specification) -> Self {
        Self {
            id: resource.id.clone(),
            url: resource.url.clone(),
            spec_name: specification.name.clone(),
            spec_version: specification.version.clone(),
            elements_href: elements_href(&resource.id),
        }
    }
}

/// Wire shape for element creation and lookup.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ElementView {
    pub id: ElementId,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub element_type: String,
    pub required: bool,
    #[serde(rename = "static")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
}

impl From<&Element> for ElementView {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            name: element.name.clone(),
            element_type: element.element_type.clone(),
            required: element.is_required,
            is_static: element.is_static,
            parent: element.parent_id.clone(),
        }
    }
}

/// Value side of the element-tree listing; the id is the map key.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ElementEntry {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub element_type: String,
    pub required: bool,
    #[serde(rename = "static")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
}

impl From<&Element> for ElementEntry {
    fn from(element: &Element) -> Self {
        Self {
            name: element.name.clone(),
            element_type: element.element_type.clone(),
            required: element.is_required,
            is_static: element.is_static,
            parent: element.parent_id.clone(),
        }
    }
}

/// Flat `id -> attributes` map returned for a resource's elements.
pub type ElementListing = BTreeMap<ElementId, ElementEntry>;

/// One row of the index listing: a specification name and its versions in
/// registration order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub versions: Vec<String>,
}
