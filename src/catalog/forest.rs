//! Client-side reconstruction of an element forest from the flat listing.
//!
//! The server never walks element trees; clients receive `id -> {.., parent}`
//! and rebuild the hierarchy themselves. This is that rebuild, used by the
//! `resteasy-tree` binary and by tests that check listings stay acyclic.

use crate::catalog::identity::ElementId;
use crate::catalog::model::{ElementEntry, ElementListing};
use std::collections::BTreeMap;
use std::fmt::{self, Write};
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ForestError {
    #[error("element {element} points at parent {parent}, which is not in the listing")]
    DanglingParent { element: ElementId, parent: ElementId },

    #[error("element {element} is not reachable from any root (parent cycle)")]
    Cycle { element: ElementId },
}

#[derive(Debug)]
pub struct ElementForest {
    entries: ElementListing,
    roots: Vec<ElementId>,
    children: BTreeMap<ElementId, Vec<ElementId>>,
}

impl ElementForest {
    /// Link every entry to its parent. Roots and children are ordered by id so
    /// the result is stable across runs.
    pub fn from_listing(entries: ElementListing) -> Result<Self, ForestError> {
        let mut roots = Vec::new();
        let mut children: BTreeMap<ElementId, Vec<ElementId>> = BTreeMap::new();
        for (id, entry) in &entries {
            match &entry.parent {
                None => roots.push(id.clone()),
                Some(parent) if !entries.contains_key(parent) => {
                    return Err(ForestError::DanglingParent {
                        element: id.clone(),
                        parent: parent.clone(),
                    });
                }
                Some(parent) => children.entry(parent.clone()).or_default().push(id.clone()),
            }
        }

        let forest = Self {
            entries,
            roots,
            children,
        };
        let reachable = forest.depth_first().len();
        if reachable < forest.entries.len() {
            let visited: Vec<&ElementId> =
                forest.depth_first().into_iter().map(|(_, id)| id).collect();
            if let Some(element) = forest.entries.keys().find(|id| !visited.contains(id)) {
                return Err(ForestError::Cycle {
                    element: element.clone(),
                });
            }
        }
        Ok(forest)
    }

    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    pub fn children(&self, id: &ElementId) -> &[ElementId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn entry(&self, id: &ElementId) -> Option<&ElementEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pre-order walk from every root, yielding `(depth, id)`.
    pub fn depth_first(&self) -> Vec<(usize, &ElementId)> {
        let mut out = Vec::with_capacity(self.entries.len());
        let mut stack: Vec<(usize, &ElementId)> =
            self.roots.iter().rev().map(|id| (0, id)).collect();
        while let Some((depth, id)) = stack.pop() {
            out.push((depth, id));
            for child in self.children(id).iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Indented `name: type` outline, one element per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (depth, id) in self.depth_first() {
            if let Some(entry) = self.entries.get(id) {
                // Writing to a String cannot fail.
                let _ = writeln!(out, "{}{}", "  ".repeat(depth), EntryLine(entry));
            }
        }
        out
    }
}

struct EntryLine<'a>(&'a ElementEntry);

impl fmt::Display for EntryLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.0;
        write!(
            f,
            "{}: {}",
            entry.name.as_deref().unwrap_or("<unnamed>"),
            entry.element_type
        )?;
        if !entry.required {
            f.write_str(" (optional)")?;
        }
        if !entry.is_static {
            f.write_str(" (dynamic)")?;
        }
        Ok(())
    }
}
