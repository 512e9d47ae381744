//! In-process store used by tests and by `resteasy-serve` when no database
//! path is configured.

use crate::catalog::identity::{ElementId, ResourceId, SpecificationId};
use crate::catalog::model::{Element, Resource, Specification};
use crate::error::StoreError;
use crate::store::{CatalogStore, StoreResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Creation-ordered record vectors plus an id -> position index per kind.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    closed: bool,
    specifications: Table<SpecificationId, Specification>,
    resources: Table<ResourceId, Resource>,
    elements: Table<ElementId, Element>,
}

struct Table<K, V> {
    rows: Vec<V>,
    by_id: BTreeMap<K, usize>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            by_id: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, V: Clone> Table<K, V> {
    fn insert(&mut self, id: &K, row: V) -> V {
        if let Some(&position) = self.by_id.get(id) {
            return self.rows[position].clone();
        }
        self.by_id.insert(id.clone(), self.rows.len());
        self.rows.push(row.clone());
        row
    }

    fn get(&self, id: &K) -> Option<V> {
        self.by_id.get(id).map(|&position| self.rows[position].clone())
    }

    fn filter(&self, predicate: impl Fn(&V) -> bool) -> Vec<V> {
        self.rows.iter().filter(|row| predicate(*row)).cloned().collect()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryState) -> T) -> StoreResult<T> {
        let state = self.state.read();
        if state.closed {
            return Err(StoreError::Closed);
        }
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> StoreResult<T> {
        let mut state = self.state.write();
        if state.closed {
            return Err(StoreError::Closed);
        }
        Ok(f(&mut state))
    }
}

impl CatalogStore for MemoryStore {
    fn insert_specification(&self, specification: Specification) -> StoreResult<Specification> {
        self.write(|state| {
            let id = specification.id.clone();
            state.specifications.insert(&id, specification)
        })
    }

    fn specification(&self, name: &str, version: &str) -> StoreResult<Option<Specification>> {
        self.read(|state| {
            state
                .specifications
                .rows
                .iter()
                .find(|spec| spec.name == name && spec.version == version)
                .cloned()
        })
    }

    fn specification_by_id(&self, id: &SpecificationId) -> StoreResult<Option<Specification>> {
        self.read(|state| state.specifications.get(id))
    }

    fn specifications(&self) -> StoreResult<Vec<Specification>> {
        self.read(|state| state.specifications.rows.clone())
    }

    fn insert_resource(&self, resource: Resource) -> StoreResult<Resource> {
        self.write(|state| {
            let id = resource.id.clone();
            state.resources.insert(&id, resource)
        })
    }

    fn resource(&self, id: &ResourceId) -> StoreResult<Option<Resource>> {
        self.read(|state| state.resources.get(id))
    }

    fn resources_for(&self, specification: &SpecificationId) -> StoreResult<Vec<Resource>> {
        self.read(|state| {
            state
                .resources
                .filter(|resource| &resource.specification_id == specification)
        })
    }

    fn insert_element(&self, element: Element) -> StoreResult<Element> {
        self.write(|state| {
            let id = element.id.clone();
            state.elements.insert(&id, element)
        })
    }

    fn element(&self, id: &ElementId) -> StoreResult<Option<Element>> {
        self.read(|state| state.elements.get(id))
    }

    fn elements_for(&self, resource: &ResourceId) -> StoreResult<Vec<Element>> {
        self.read(|state| state.elements.filter(|element| &element.resource_id == resource))
    }

    fn close(&self) -> StoreResult<()> {
        self.state.write().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::identity::{resource_id, specification_id};

    fn spec(name: &str, version: &str) -> Specification {
        Specification {
            id: specification_id(name, version),
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn insert_keeps_first_record_for_an_id() {
        let store = MemoryStore::new();
        let first = store.insert_specification(spec("config", "v1")).unwrap();
        let mut clash = spec("config", "v1");
        clash.name = "other".to_string();
        let stored = store.insert_specification(clash).unwrap();
        assert_eq!(stored, first);
        assert_eq!(store.specifications().unwrap().len(), 1);
    }

    #[test]
    fn specifications_come_back_in_creation_order() {
        let store = MemoryStore::new();
        for (name, version) in [("b", "v2"), ("a", "v1"), ("b", "v1")] {
            store.insert_specification(spec(name, version)).unwrap();
        }
        let versions: Vec<_> = store
            .specifications()
            .unwrap()
            .into_iter()
            .map(|s| format!("{}:{}", s.name, s.version))
            .collect();
        assert_eq!(versions, ["b:v2", "a:v1", "b:v1"]);
    }

    #[test]
    fn filters_resources_by_owner() {
        let store = MemoryStore::new();
        let v1 = store.insert_specification(spec("config", "v1")).unwrap();
        let v2 = store.insert_specification(spec("config", "v2")).unwrap();
        for (url, owner) in [("a", &v1), ("b", &v2), ("c", &v1)] {
            store
                .insert_resource(Resource {
                    id: resource_id(url, &owner.id),
                    url: url.to_string(),
                    specification_id: owner.id.clone(),
                })
                .unwrap();
        }
        let urls: Vec<_> = store
            .resources_for(&v1.id)
            .unwrap()
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(urls, ["a", "c"]);
    }

    #[test]
    fn closed_store_rejects_calls() {
        let store = MemoryStore::new();
        store.close().unwrap();
        assert!(matches!(
            store.specifications(),
            Err(StoreError::Closed)
        ));
    }
}
