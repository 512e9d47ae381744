//! Element forests, one per resource.
//!
//! Elements are registered one at a time against a resolved resource and an
//! optional parent. The parent must already exist and belong to the same
//! resource, so every stored forest is acyclic by construction: a child can
//! only point at an element that was inserted before it. Depth and width are
//! not bounded here.

use crate::catalog::identity::{ElementId, ResourceId, element_id};
use crate::catalog::model::{Element, ElementEntry, ElementListing};
use crate::error::{CatalogError, CatalogResult};
use crate::store::CatalogStore;
use std::sync::Arc;
use tracing::debug;

/// Attributes for a new element. `required` and `static` default to true.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewElement {
    pub name: Option<String>,
    pub element_type: String,
    pub is_required: bool,
    pub is_static: bool,
    pub parent: Option<ElementId>,
}

impl NewElement {
    pub fn new(element_type: impl Into<String>) -> Self {
        Self {
            name: None,
            element_type: element_type.into(),
            is_required: true,
            is_static: true,
            parent: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn child_of(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }
}

#[derive(Clone)]
pub struct ElementTree {
    store: Arc<dyn CatalogStore>,
}

impl ElementTree {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Register an element on `resource`.
    ///
    /// Fails with `NotFound` when the resource or the parent is unknown and
    /// with `Validation` when the type is empty or the parent belongs to a
    /// different resource. Re-registering an identical key returns the
    /// element stored first.
    pub fn register(&self, resource: &ResourceId, new: NewElement) -> CatalogResult<Element> {
        if self.store.resource(resource)?.is_none() {
            return Err(CatalogError::not_found(format!(
                "Resource with ID '{resource}' does not exist"
            )));
        }
        if new.element_type.is_empty() {
            return Err(CatalogError::validation("type cannot be null or empty"));
        }
        if let Some(parent_id) = &new.parent {
            let parent = self.find(parent_id)?;
            if &parent.resource_id != resource {
                return Err(CatalogError::validation(format!(
                    "Parent element '{parent_id}' belongs to resource '{}', not '{resource}'",
                    parent.resource_id
                )));
            }
        }

        let candidate = Element {
            id: element_id(
                new.name.as_deref(),
                &new.element_type,
                resource,
                new.parent.as_ref(),
            ),
            name: new.name,
            element_type: new.element_type,
            is_required: new.is_required,
            is_static: new.is_static,
            resource_id: resource.clone(),
            parent_id: new.parent,
        };
        let stored = self.store.insert_element(candidate)?;
        debug!(
            id = %stored.id,
            resource = %resource,
            parent = stored.parent_id.as_ref().map(ElementId::as_str),
            "registered element"
        );
        Ok(stored)
    }

    /// Flat `id -> attributes` map of every element on `resource`.
    ///
    /// Unknown resources are `NotFound`; a resource without elements is an
    /// `EmptyResult`.
    pub fn list_by_resource(&self, resource: &ResourceId) -> CatalogResult<ElementListing> {
        if self.store.resource(resource)?.is_none() {
            return Err(CatalogError::not_found(format!(
                "Resource with id: '{resource}' does not exist."
            )));
        }
        let elements = self.store.elements_for(resource)?;
        if elements.is_empty() {
            return Err(CatalogError::empty_result(format!(
                "Properties not found for resource with id {resource}"
            )));
        }
        Ok(elements
            .iter()
            .map(|element| (element.id.clone(), ElementEntry::from(element)))
            .collect())
    }

    pub fn find(&self, id: &ElementId) -> CatalogResult<Element> {
        self.store.element(id)?.ok_or_else(|| {
            CatalogError::not_found(format!("Element with id '{id}' does not exist"))
        })
    }
}
