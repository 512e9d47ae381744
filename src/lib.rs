//! Catalog of API specifications, the resources they define and the element
//! trees describing each resource payload.
//!
//! The library holds the catalog components, the store backends and the
//! request protocol; the binaries are thin layers over it. `resteasy-serve`
//! puts the protocol behind HTTP and `resteasy-tree` renders element trees
//! from a catalog file. Ids are content-derived (see [`catalog::identity`]),
//! so the same inputs always name the same record.

pub mod catalog;
pub mod config;
pub mod contract;
pub mod error;
pub mod protocol;
pub mod routes;
pub mod store;

pub use catalog::{
    Catalog, Element, ElementEntry, ElementForest, ElementId, ElementListing, ElementTree,
    ElementView, IndexEntry, NewElement, Resource, ResourceId, ResourceIndex, ResourceView,
    Specification, SpecificationCatalog, SpecificationId,
};
pub use config::{ServeArgs, ServeConfig};
pub use contract::{ContractSchemas, Envelope};
pub use error::{CatalogError, CatalogResult, ErrorKind, StoreError};
pub use protocol::{Method, Operation, Protocol, Request, RequestFailure, Response};
pub use store::{CatalogStore, MemoryStore, SqliteStore};
