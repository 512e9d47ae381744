//! Specification → Resource → Element catalog.
//!
//! Each component owns one level of the hierarchy and talks to the shared
//! [`CatalogStore`]; none of them cache anything between calls. [`Catalog`]
//! bundles the three components over one store for the protocol layer.

pub mod elements;
pub mod forest;
pub mod identity;
pub mod model;
pub mod resources;
pub mod specifications;

pub use elements::{ElementTree, NewElement};
pub use forest::{ElementForest, ForestError};
pub use identity::{ElementId, ResourceId, SpecificationId};
pub use model::{
    Element, ElementEntry, ElementListing, ElementView, IndexEntry, Resource, ResourceView,
    Specification, elements_href,
};
pub use resources::ResourceIndex;
pub use specifications::SpecificationCatalog;

use crate::store::CatalogStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn CatalogStore>,
    specifications: SpecificationCatalog,
    resources: ResourceIndex,
    elements: ElementTree,
}

impl Catalog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            specifications: SpecificationCatalog::new(store.clone()),
            resources: ResourceIndex::new(store.clone()),
            elements: ElementTree::new(store.clone()),
            store,
        }
    }

    pub fn specifications(&self) -> &SpecificationCatalog {
        &self.specifications
    }

    pub fn resources(&self) -> &ResourceIndex {
        &self.resources
    }

    pub fn elements(&self) -> &ElementTree {
        &self.elements
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }
}
