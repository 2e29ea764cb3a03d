use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, TypeError};
use crate::path::DocPath;

/// An atomic multi-path write.
///
/// Each entry maps a path (relative to the root the patch is submitted
/// against) to a new value, or to `None` to delete the subtree at that path.
/// A JSON `null` is normalized to a delete. Paths must not contain one
/// another; [`Patch::validate`] enforces that before submission.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    entries: BTreeMap<DocPath, Option<Value>>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `path` to `value`. A later write to the same path replaces the
    /// earlier one.
    pub fn set(&mut self, path: DocPath, value: Value) -> &mut Self {
        let value = if value.is_null() { None } else { Some(value) };
        self.entries.insert(path, value);
        self
    }

    /// Serialize `value` and set it at `path`.
    pub fn set_json<T: Serialize>(&mut self, path: DocPath, value: &T) -> Result<&mut Self> {
        let value = serde_json::to_value(value)?;
        Ok(self.set(path, value))
    }

    /// Delete the subtree at `path`.
    pub fn delete(&mut self, path: DocPath) -> &mut Self {
        self.entries.insert(path, None);
        self
    }

    /// Builder-style variant of [`Patch::set`].
    pub fn with(mut self, path: DocPath, value: Value) -> Self {
        self.set(path, value);
        self
    }

    /// Builder-style variant of [`Patch::delete`].
    pub fn without(mut self, path: DocPath) -> Self {
        self.delete(path);
        self
    }

    pub fn get(&self, path: &DocPath) -> Option<&Option<Value>> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &DocPath> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DocPath, Option<&Value>)> {
        self.entries.iter().map(|(p, v)| (p, v.as_ref()))
    }

    /// Check that no path in the patch is an ancestor of another.
    ///
    /// Overlapping entries would make the result depend on application
    /// order, so the store rejects them outright.
    pub fn validate(&self) -> Result<()> {
        // BTreeMap ordering puts an ancestor directly before its first
        // descendant, so checking neighbours is sufficient.
        let paths: Vec<&DocPath> = self.entries.keys().collect();
        for pair in paths.windows(2) {
            if pair[0].is_prefix_of(pair[1]) {
                return Err(TypeError::OverlappingPaths {
                    ancestor: pair[0].to_string(),
                    descendant: pair[1].to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn into_entries(self) -> BTreeMap<DocPath, Option<Value>> {
        self.entries
    }
}

impl IntoIterator for Patch {
    type Item = (DocPath, Option<Value>);
    type IntoIter = std::collections::btree_map::IntoIter<DocPath, Option<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
