//! `SQLite`-backed catalog store.
//!
//! One connection guarded by a mutex; every record write is a single
//! `INSERT OR IGNORE` followed by a read of the stored row under the same
//! lock. The `seq` autoincrement column preserves creation order for the
//! listing queries.

use crate::catalog::identity::{ElementId, ResourceId, SpecificationId};
use crate::catalog::model::{Element, Resource, Specification};
use crate::error::StoreError;
use crate::store::{CatalogStore, StoreResult};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};

const SCHEMA_SQL: &str = include_str!("schema.sql");

const SPECIFICATION_COLUMNS: &str = "id, name, version";
const RESOURCE_COLUMNS: &str = "id, url, specification_id";
const ELEMENT_COLUMNS: &str = "id, name, type, is_required, is_static, resource_id, parent_id";

pub struct SqliteStore {
    conn: Mutex<Option<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (creating if needed) a catalog database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        tracing::debug!(path = %path.display(), "opened sqlite catalog store");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: None,
        })
    }

    /// Database file backing this store, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> StoreResult<T> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(f(conn)?)
    }
}

fn specification_from_row(row: &Row<'_>) -> rusqlite::Result<Specification> {
    Ok(Specification {
        id: SpecificationId(row.get(0)?),
        name: row.get(1)?,
        version: row.get(2)?,
    })
}

fn resource_from_row(row: &Row<'_>) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: ResourceId(row.get(0)?),
        url: row.get(1)?,
        specification_id: SpecificationId(row.get(2)?),
    })
}

fn element_from_row(row: &Row<'_>) -> rusqlite::Result<Element> {
    Ok(Element {
        id: ElementId(row.get(0)?),
        name: row.get(1)?,
        element_type: row.get(2)?,
        is_required: row.get(3)?,
        is_static: row.get(4)?,
        resource_id: ResourceId(row.get(5)?),
        parent_id: row.get::<_, Option<String>>(6)?.map(ElementId),
    })
}

fn stored_row<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    id: &str,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<T> {
    conn.query_row(
        &format!("SELECT {columns} FROM {table} WHERE id = ?1"),
        params![id],
        map,
    )
}

fn optional_row<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    id: &str,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Option<T>> {
    stored_row(conn, table, columns, id, map).optional()
}

fn rows_where<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    field: &str,
    value: &str,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {columns} FROM {table} WHERE {field} = ?1 ORDER BY seq ASC"
    ))?;
    stmt.query_map(params![value], map)?
        .collect::<Result<Vec<_>, _>>()
}

impl CatalogStore for SqliteStore {
    fn insert_specification(&self, specification: Specification) -> StoreResult<Specification> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO specifications (id, name, version) VALUES (?1, ?2, ?3)",
                params![
                    specification.id.as_str(),
                    specification.name,
                    specification.version
                ],
            )?;
            stored_row(
                conn,
                "specifications",
                SPECIFICATION_COLUMNS,
                specification.id.as_str(),
                specification_from_row,
            )
        })
    }

    fn specification(&self, name: &str, version: &str) -> StoreResult<Option<Specification>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {SPECIFICATION_COLUMNS} FROM specifications \
                     WHERE name = ?1 AND version = ?2 ORDER BY seq ASC LIMIT 1"
                ),
                params![name, version],
                specification_from_row,
            )
            .optional()
        })
    }

    fn specification_by_id(&self, id: &SpecificationId) -> StoreResult<Option<Specification>> {
        self.with_conn(|conn| {
            optional_row(
                conn,
                "specifications",
                SPECIFICATION_COLUMNS,
                id.as_str(),
                specification_from_row,
            )
        })
    }

    fn specifications(&self) -> StoreResult<Vec<Specification>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SPECIFICATION_COLUMNS} FROM specifications ORDER BY seq ASC"
            ))?;
            stmt.query_map([], specification_from_row)?
                .collect::<Result<Vec<_>, _>>()
        })
    }

    fn insert_resource(&self, resource: Resource) -> StoreResult<Resource> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO resources (id, url, specification_id) VALUES (?1, ?2, ?3)",
                params![
                    resource.id.as_str(),
                    resource.url,
                    resource.specification_id.as_str()
                ],
            )?;
            stored_row(
                conn,
                "resources",
                RESOURCE_COLUMNS,
                resource.id.as_str(),
                resource_from_row,
            )
        })
    }

    fn resource(&self, id: &ResourceId) -> StoreResult<Option<Resource>> {
        self.with_conn(|conn| {
            optional_row(
                conn,
                "resources",
                RESOURCE_COLUMNS,
                id.as_str(),
                resource_from_row,
            )
        })
    }

    fn resources_for(&self, specification: &SpecificationId) -> StoreResult<Vec<Resource>> {
        self.with_conn(|conn| {
            rows_where(
                conn,
                "resources",
                RESOURCE_COLUMNS,
                "specification_id",
                specification.as_str(),
                resource_from_row,
            )
        })
    }

    fn insert_element(&self, element: Element) -> StoreResult<Element> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO elements \
                 (id, name, type, is_required, is_static, resource_id, parent_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    element.id.as_str(),
                    element.name,
                    element.element_type,
                    element.is_required,
                    element.is_static,
                    element.resource_id.as_str(),
                    element.parent_id.as_ref().map(ElementId::as_str),
                ],
            )?;
            stored_row(
                conn,
                "elements",
                ELEMENT_COLUMNS,
                element.id.as_str(),
                element_from_row,
            )
        })
    }

    fn element(&self, id: &ElementId) -> StoreResult<Option<Element>> {
        self.with_conn(|conn| {
            optional_row(conn, "elements", ELEMENT_COLUMNS, id.as_str(), element_from_row)
        })
    }

    fn elements_for(&self, resource: &ResourceId) -> StoreResult<Vec<Element>> {
        self.with_conn(|conn| {
            rows_where(
                conn,
                "elements",
                ELEMENT_COLUMNS,
                "resource_id",
                resource.as_str(),
                element_from_row,
            )
        })
    }

    fn close(&self) -> StoreResult<()> {
        let Some(conn) = self.conn.lock().take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, err)| StoreError::Database(err))?;
        tracing::debug!("closed sqlite catalog store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::identity::{element_id, resource_id, specification_id};

    fn seeded() -> (SqliteStore, Specification, Resource) {
        let store = SqliteStore::in_memory().unwrap();
        let spec = store
            .insert_specification(Specification {
                id: specification_id("config", "v1"),
                name: "config".into(),
                version: "v1".into(),
            })
            .unwrap();
        let resource = store
            .insert_resource(Resource {
                id: resource_id("config/v1/first", &spec.id),
                url: "config/v1/first".into(),
                specification_id: spec.id.clone(),
            })
            .unwrap();
        (store, spec, resource)
    }

    #[test]
    fn looks_up_specification_by_exact_fields() {
        let (store, spec, _) = seeded();
        assert_eq!(store.specification("config", "v1").unwrap(), Some(spec));
        assert_eq!(store.specification("config", "v2").unwrap(), None);
    }

    #[test]
    fn element_round_trips_optional_columns() {
        let (store, _, resource) = seeded();
        let root = store
            .insert_element(Element {
                id: element_id(None, "object", &resource.id, None),
                name: None,
                element_type: "object".into(),
                is_required: false,
                is_static: true,
                resource_id: resource.id.clone(),
                parent_id: None,
            })
            .unwrap();
        let child = Element {
            id: element_id(Some("child"), "string", &resource.id, Some(&root.id)),
            name: Some("child".into()),
            element_type: "string".into(),
            is_required: true,
            is_static: false,
            resource_id: resource.id.clone(),
            parent_id: Some(root.id.clone()),
        };
        store.insert_element(child.clone()).unwrap();

        assert_eq!(store.element(&child.id).unwrap(), Some(child.clone()));
        let listed = store.elements_for(&resource.id).unwrap();
        assert_eq!(listed, vec![root, child]);
    }

    #[test]
    fn duplicate_insert_returns_first_record() {
        let (store, _, resource) = seeded();
        let again = store
            .insert_resource(Resource {
                url: "ignored".into(),
                ..resource.clone()
            })
            .unwrap();
        assert_eq!(again, resource);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.sqlite");
        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .insert_specification(Specification {
                    id: specification_id("config", "v1"),
                    name: "config".into(),
                    version: "v1".into(),
                })
                .unwrap();
            store.close().unwrap();
            assert!(matches!(store.specifications(), Err(StoreError::Closed)));
        }
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.path(), Some(path.as_path()));
        assert_eq!(reopened.specifications().unwrap().len(), 1);
    }
}
