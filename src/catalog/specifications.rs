//! Registry of `(name, version)` pairs.

use crate::catalog::identity::{SpecificationId, specification_id};
use crate::catalog::model::{IndexEntry, Specification};
use crate::error::{CatalogError, CatalogResult};
use crate::store::CatalogStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct SpecificationCatalog {
    store: Arc<dyn CatalogStore>,
}

impl SpecificationCatalog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Register a specification and return the stored record.
    ///
    /// Registering an existing `(name, version)` returns the record already
    /// stored. A different key whose plain concatenation matches an existing
    /// one (`"configv" + "1"` vs `"config" + "v1"`) shares its id and is
    /// rejected as a validation failure.
    pub fn register(&self, name: &str, version: &str) -> CatalogResult<Specification> {
        if name.is_empty() {
            return Err(CatalogError::validation("name cannot be null or empty"));
        }
        if version.is_empty() {
            return Err(CatalogError::validation("version cannot be null or empty"));
        }

        let candidate = Specification {
            id: specification_id(name, version),
            name: name.to_string(),
            version: version.to_string(),
        };
        let stored = self.store.insert_specification(candidate)?;
        if stored.name != name || stored.version != version {
            return Err(CatalogError::validation(format!(
                "specification '{name}:{version}' collides with '{}:{}' (id {})",
                stored.name, stored.version, stored.id
            )));
        }
        debug!(id = %stored.id, name, version, "registered specification");
        Ok(stored)
    }

    /// Group every registered version under its name.
    ///
    /// Names appear in order of first registration and versions in creation
    /// order; neither is sorted. An empty catalog is an `EmptyResult`.
    pub fn list_grouped_by_name(&self) -> CatalogResult<Vec<IndexEntry>> {
        let specifications = self.store.specifications()?;
        if specifications.is_empty() {
            return Err(CatalogError::empty_result(
                "No specifications defined in the system.",
            ));
        }

        let mut entries: Vec<IndexEntry> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for spec in specifications {
            match positions.get(&spec.name) {
                Some(&position) => entries[position].versions.push(spec.version),
                None => {
                    positions.insert(spec.name.clone(), entries.len());
                    entries.push(IndexEntry {
                        name: spec.name,
                        versions: vec![spec.version],
                    });
                }
            }
        }
        Ok(entries)
    }

    pub fn find(&self, name: &str, version: &str) -> CatalogResult<Specification> {
        self.store.specification(name, version)?.ok_or_else(|| {
            CatalogError::not_found(format!(
                "Specification '{name}:{version}' does not exist."
            ))
        })
    }

    pub fn get(&self, id: &SpecificationId) -> CatalogResult<Specification> {
        self.store.specification_by_id(id)?.ok_or_else(|| {
            CatalogError::not_found(format!("Specification with id '{id}' does not exist."))
        })
    }
}
