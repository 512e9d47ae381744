//! Resources bound to exactly one specification.

use crate::catalog::identity::{ResourceId, resource_id};
use crate::catalog::model::{Resource, ResourceView, Specification};
use crate::error::{CatalogError, CatalogResult};
use crate::store::CatalogStore;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct ResourceIndex {
    store: Arc<dyn CatalogStore>,
}

impl ResourceIndex {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Register `url` under an already-resolved specification.
    ///
    /// The specification is re-read from the store before the insert so a
    /// caller-built value cannot smuggle in an unknown owner. The read and the
    /// insert are not isolated from concurrent writers.
    pub fn register(&self, url: &str, specification: &Specification) -> CatalogResult<Resource> {
        if url.is_empty() {
            return Err(CatalogError::validation("url cannot be null or empty"));
        }
        if self.store.specification_by_id(&specification.id)?.is_none() {
            return Err(CatalogError::not_found(format!(
                "Specification '{}:{}' does not exist.",
                specification.name, specification.version
            )));
        }

        let candidate = Resource {
            id: resource_id(url, &specification.id),
            url: url.to_string(),
            specification_id: specification.id.clone(),
        };
        let stored = self.store.insert_resource(candidate)?;
        debug!(id = %stored.id, url, specification = %specification.id, "registered resource");
        Ok(stored)
    }

    /// Resources owned by `specification`, in creation order.
    ///
    /// Zero resources is an `EmptyResult`, never an empty list.
    pub fn list_by_specification(
        &self,
        specification: &Specification,
    ) -> CatalogResult<Vec<Resource>> {
        let resources = self.store.resources_for(&specification.id)?;
        if resources.is_empty() {
            return Err(CatalogError::empty_result(format!(
                "No resources defined for the specification {}:{}",
                specification.name, specification.version
            )));
        }
        Ok(resources)
    }

    pub fn find(&self, id: &ResourceId) -> CatalogResult<Resource> {
        self.store.resource(id)?.ok_or_else(|| {
            CatalogError::not_found(format!("Resource with id: '{id}' does not exist."))
        })
    }

    /// Render `resource` with its owning specification denormalized in.
    pub fn view(&self, resource: &Resource) -> CatalogResult<ResourceView> {
        let specification = self
            .store
            .specification_by_id(&resource.specification_id)?
            .ok_or_else(|| {
                CatalogError::not_found(format!(
                    "Specification with id '{}' owning resource '{}' does not exist.",
                    resource.specification_id, resource.id
                ))
            })?;
        Ok(ResourceView::new(resource, &specification))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SpecificationCatalog;
    use crate::catalog::identity::specification_id;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;

    fn setup() -> (SpecificationCatalog, ResourceIndex) {
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
        (
            SpecificationCatalog::new(store.clone()),
            ResourceIndex::new(store),
        )
    }

    #[test]
    fn register_returns_view_with_elements_href() {
        let (specs, resources) = setup();
        let spec = specs.register("config", "v1").unwrap();
        let resource = resources.register("config/v1/first", &spec).unwrap();
        assert_eq!(resource.id, resource_id("config/v1/first", &spec.id));

        let view = resources.view(&resource).unwrap();
        assert_eq!(view.spec_name, "config");
        assert_eq!(view.spec_version, "v1");
        assert_eq!(
            view.elements_href,
            format!("/resources/{}/elements", resource.id)
        );
    }

    #[test]
    fn rejects_empty_url() {
        let (specs, resources) = setup();
        let spec = specs.register("config", "v1").unwrap();
        let err = resources.register("", &spec).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn unknown_owner_is_not_found() {
        let (_, resources) = setup();
        let ghost = Specification {
            id: specification_id("ghost", "v1"),
            name: "ghost".into(),
            version: "v1".into(),
        };
        let err = resources.register("ghost/v1/a", &ghost).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn listing_without_resources_is_empty_result() {
        let (specs, resources) = setup();
        let spec = specs.register("config", "v1").unwrap();
        let err = resources.list_by_specification(&spec).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
        assert_eq!(
            err.to_string(),
            "No resources defined for the specification config:v1"
        );
    }

    #[test]
    fn listing_is_scoped_to_the_specification() {
        let (specs, resources) = setup();
        let v1 = specs.register("config", "v1").unwrap();
        let v2 = specs.register("config", "v2").unwrap();
        resources.register("config/v1/first", &v1).unwrap();
        resources.register("config/v2/first", &v2).unwrap();
        resources.register("config/v1/second", &v1).unwrap();

        let urls: Vec<_> = resources
            .list_by_specification(&v1)
            .unwrap()
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(urls, ["config/v1/first", "config/v1/second"]);
    }

    #[test]
    fn find_round_trips_and_reports_missing() {
        let (specs, resources) = setup();
        let spec = specs.register("config", "v1").unwrap();
        let created = resources.register("config/v1/first", &spec).unwrap();
        assert_eq!(resources.find(&created.id).unwrap(), created);

        let err = resources
            .find(&ResourceId::from("0123456789abcdef0123456789abcdef"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
