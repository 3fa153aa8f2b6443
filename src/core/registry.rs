// named collections
use indexmap::IndexMap;
use tracing::debug;

use crate::core::collection::{Collection, CollectionOptions};
use crate::core::error::{LinkError, LinkResult};
use crate::mapping::config::LinkerConfig;

/// Table of named collections.
///
/// Collections are created once and live as long as the registry; there is no way to
/// remove one. Drop the registry to start over.
#[derive(Debug, Default)]
pub struct Registry {
    config: LinkerConfig,
    collections: IndexMap<String, Collection>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose collections fall back to `config` for transforms and relation maps.
    pub fn with_config(config: LinkerConfig) -> Self {
        Self {
            config,
            collections: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Creates and registers a collection.
    ///
    /// Transform: `options.transform`, else the configured transform for `name`, else
    /// the configured default. Map: `options.map`, else the configured map for `name`,
    /// else empty.
    pub fn create(
        &mut self,
        name: &str,
        options: CollectionOptions,
    ) -> LinkResult<&mut Collection> {
        if self.exists(name) {
            return Err(LinkError::already_exists(name));
        }

        let transform = options.transform.or_else(|| self.config.transform_for(name));
        let map = options
            .map
            .or_else(|| self.config.map_for(name).cloned())
            .unwrap_or_default();

        debug!(
            collection = name,
            relations = map.len(),
            transform = transform.is_some(),
            "creating collection"
        );

        let collection = Collection::new(name.to_string(), map, transform);
        Ok(self.collections.entry(name.to_string()).or_insert(collection))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> LinkResult<&Collection> {
        self.collections.get(name).ok_or_else(|| LinkError::not_found(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> LinkResult<&mut Collection> {
        self.collections.get_mut(name).ok_or_else(|| LinkError::not_found(name))
    }

    /// Navigable view of a collection: lookups through it produce [`Item`](crate::Item)s
    /// that can follow relations.
    pub fn collection(&self, name: &str) -> LinkResult<CollectionRef<'_>> {
        let collection = self.lookup(name)?;
        Ok(CollectionRef {
            registry: self,
            collection,
        })
    }

    /// Collection names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.collections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// A collection bound to the registry it lives in.
#[derive(Debug, Clone, Copy)]
pub struct CollectionRef<'r> {
    pub(crate) registry: &'r Registry,
    pub(crate) collection: &'r Collection,
}

impl<'r> CollectionRef<'r> {
    pub fn name(&self) -> &'r str {
        self.collection.name()
    }

    pub fn collection(&self) -> &'r Collection {
        self.collection
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }
}
