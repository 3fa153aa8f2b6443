// relation resolution: which collection (if any) does a field point at?
//
// 1. explicit override in the collection's relation map always wins
// 2. otherwise a field named after an existing collection points at it,
//    unless that collection is already claimed as an override target in the map
// 3. otherwise the field is a plain value
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::collection::Collection;
use crate::core::registry::Registry;

/// Explicit field -> collection overrides of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationMap {
    fields: IndexMap<String, String>,
}

impl RelationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `field` to the collection named `collection`.
    pub fn with(mut self, field: impl Into<String>, collection: impl Into<String>) -> Self {
        self.insert(field, collection);
        self
    }

    pub fn insert(
        &mut self,
        field: impl Into<String>,
        collection: impl Into<String>,
    ) -> Option<String> {
        self.fields.insert(field.into(), collection.into())
    }

    pub fn target(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// True if some field is routed to `collection`.
    pub fn claims(&self, collection: &str) -> bool {
        self.fields.values().any(|target| target == collection)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields.iter().map(|(f, c)| (f.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<F: Into<String>, C: Into<String>> FromIterator<(F, C)> for RelationMap {
    fn from_iter<I: IntoIterator<Item = (F, C)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(f, c)| (f.into(), c.into())).collect(),
        }
    }
}

/// Resolution against an arbitrary set of live collection names.
pub fn resolve_target<'a>(
    map: &'a RelationMap,
    field: &'a str,
    exists: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    if let Some(target) = map.target(field) {
        return Some(target);
    }
    if exists(field) && !map.claims(field) {
        return Some(field);
    }
    None
}

impl Registry {
    /// Name of the collection `field` refers to when read from a record of `collection`,
    /// or `None` if the field holds a plain value.
    pub fn resolve_target<'a>(
        &self,
        collection: &'a Collection,
        field: &'a str,
    ) -> Option<&'a str> {
        let target = resolve_target(collection.relation_map(), field, |name| self.exists(name));
        trace!(collection = collection.name(), field, resolved = ?target, "resolved relation");
        target
    }
}
