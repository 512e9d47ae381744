//! Persistent store collaborator.
//!
//! Components receive an `Arc<dyn CatalogStore>` instead of reaching for
//! ambient state. Each backend offers, per entity kind, insert,
//! get-by-exact-fields and filter-by-field, and serializes individual record
//! writes. There are no multi-record transactions: resolving a parent and
//! inserting a child are separate calls.
//!
//! Inserts are insert-if-absent keyed on the content-derived id and return
//! the record that ends up stored, so re-registering the same key yields the
//! first stored record.

pub mod memory;
pub mod sqlite;

use crate::catalog::identity::{ElementId, ResourceId, SpecificationId};
use crate::catalog::model::{Element, Resource, Specification};
use crate::error::StoreError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

pub trait CatalogStore: Send + Sync {
    fn insert_specification(&self, specification: Specification) -> StoreResult<Specification>;

    /// Exact match on `(name, version)`.
    fn specification(&self, name: &str, version: &str) -> StoreResult<Option<Specification>>;

    fn specification_by_id(&self, id: &SpecificationId) -> StoreResult<Option<Specification>>;

    /// Every specification in creation order.
    fn specifications(&self) -> StoreResult<Vec<Specification>>;

    fn insert_resource(&self, resource: Resource) -> StoreResult<Resource>;

    fn resource(&self, id: &ResourceId) -> StoreResult<Option<Resource>>;

    /// Resources owned by `specification`, in creation order.
    fn resources_for(&self, specification: &SpecificationId) -> StoreResult<Vec<Resource>>;

    fn insert_element(&self, element: Element) -> StoreResult<Element>;

    fn element(&self, id: &ElementId) -> StoreResult<Option<Element>>;

    /// Elements owned by `resource`, in creation order.
    fn elements_for(&self, resource: &ResourceId) -> StoreResult<Vec<Element>>;

    /// Release the backend. Later calls fail with [`StoreError::Closed`].
    fn close(&self) -> StoreResult<()>;
}
