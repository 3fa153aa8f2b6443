//! Registry-level fallbacks for collection settings.
//!
//! A collection created without an explicit transform or relation map takes them from
//! here. Resolution order for transforms:
//!
//! 1. `transform` passed in [`CollectionOptions`](crate::CollectionOptions)
//! 2. transform registered for the collection's name
//! 3. default transform
//!
//! Relation maps follow the same order without a default layer; a collection with no
//! map from either source starts with an empty one.
//!
//! Relation maps can also be loaded from TOON or JSON text shaped as
//! `{ collection: { field: target_collection } }`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::core::collection::{Collection, Transform};
use crate::core::error::{LinkError, LinkResult};
use crate::core::record::Record;
use crate::core::relation::RelationMap;

#[derive(Clone, Default)]
pub struct LinkerConfig {
    default_transform: Option<Transform>,
    transforms: HashMap<String, Transform>,
    maps: HashMap<String, RelationMap>,
}

impl LinkerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform for collections that have neither an explicit nor a named transform.
    pub fn with_default_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Record, &Collection) -> Record + Send + Sync + 'static,
    {
        self.default_transform = Some(Arc::new(f));
        self
    }

    pub fn with_transform<F>(mut self, collection: impl Into<String>, f: F) -> Self
    where
        F: Fn(Record, &Collection) -> Record + Send + Sync + 'static,
    {
        self.transforms.insert(collection.into(), Arc::new(f));
        self
    }

    pub fn with_map(mut self, collection: impl Into<String>, map: RelationMap) -> Self {
        self.maps.insert(collection.into(), map);
        self
    }

    /// Merges relation maps read from TOON text. Later entries replace earlier ones
    /// for the same collection.
    pub fn with_maps_from_toon(self, text: &str) -> LinkResult<Self> {
        let value: Value =
            toon_format::decode_default(text).map_err(|e| LinkError::Decode(e.to_string()))?;
        let maps: HashMap<String, RelationMap> = serde_json::from_value(value)?;
        Ok(self.merge_maps(maps))
    }

    pub fn with_maps_from_json(self, text: &str) -> LinkResult<Self> {
        let maps: HashMap<String, RelationMap> = serde_json::from_str(text)?;
        Ok(self.merge_maps(maps))
    }

    fn merge_maps(mut self, maps: HashMap<String, RelationMap>) -> Self {
        self.maps.extend(maps);
        self
    }

    pub fn transform_for(&self, collection: &str) -> Option<Transform> {
        self.transforms
            .get(collection)
            .or(self.default_transform.as_ref())
            .cloned()
    }

    pub fn map_for(&self, collection: &str) -> Option<&RelationMap> {
        self.maps.get(collection)
    }
}

impl fmt::Debug for LinkerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut named: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        named.sort_unstable();
        f.debug_struct("LinkerConfig")
            .field("default_transform", &self.default_transform.is_some())
            .field("transforms", &named)
            .field("maps", &self.maps)
            .finish()
    }
}
