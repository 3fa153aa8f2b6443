// collection = record store + relation map + transform
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::core::error::{LinkError, LinkResult};
use crate::core::record::{Record, RecordMut, RecordStore};
use crate::core::relation::RelationMap;
use crate::core::types::RecordId;

/// Hook applied to every record once, right before it is stored.
pub type Transform = Arc<dyn Fn(Record, &Collection) -> Record + Send + Sync>;

/// Per-collection settings given at creation time. Unset fields fall back to the
/// registry's [`LinkerConfig`](crate::LinkerConfig).
#[derive(Clone, Default)]
pub struct CollectionOptions {
    pub transform: Option<Transform>,
    pub map: Option<RelationMap>,
}

impl CollectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Record, &Collection) -> Record + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }

    pub fn map(mut self, map: RelationMap) -> Self {
        self.map = Some(map);
        self
    }
}

impl fmt::Debug for CollectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionOptions")
            .field("transform", &self.transform.is_some())
            .field("map", &self.map)
            .finish()
    }
}

/// A named store of records sharing one relation policy.
pub struct Collection {
    name: String,
    store: RecordStore,
    map: RelationMap,
    transform: Option<Transform>,
}

impl Collection {
    pub(crate) fn new(name: String, map: RelationMap, transform: Option<Transform>) -> Self {
        Self {
            name,
            store: RecordStore::new(),
            map,
            transform,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relation_map(&self) -> &RelationMap {
        &self.map
    }

    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    fn missing_id(&self) -> LinkError {
        LinkError::MissingIdentifier {
            collection: self.name.clone(),
        }
    }

    fn duplicate(&self, id: RecordId) -> LinkError {
        LinkError::DuplicateIdentifier {
            collection: self.name.clone(),
            id,
        }
    }

    /// Transforms and stores `record`, returning the stored version.
    ///
    /// Fails with [`LinkError::DuplicateIdentifier`] if the id (before or after the
    /// transform) is already taken; the record is then dropped and the store is
    /// unchanged.
    pub fn add(&mut self, record: Record) -> LinkResult<&Record> {
        let incoming = record.id().ok_or_else(|| self.missing_id())?;
        if self.store.contains(&incoming) {
            return Err(self.duplicate(incoming));
        }

        let record = match &self.transform {
            Some(transform) => transform(record, &*self),
            None => record,
        };

        //the transform may have rewritten the id
        let id = record.id().ok_or_else(|| self.missing_id())?;
        trace!(collection = %self.name, %id, "adding record");

        match self.store.insert(id, record) {
            Ok(stored) => Ok(stored),
            Err((id, _)) => Err(LinkError::DuplicateIdentifier {
                collection: self.name.clone(),
                id,
            }),
        }
    }

    /// Adds records in order. The first failure stops the import; records added before
    /// it stay in the collection.
    pub fn import<I>(&mut self, records: I) -> LinkResult<()>
    where
        I: IntoIterator<Item = Record>,
    {
        for record in records {
            self.add(record)?;
        }
        Ok(())
    }

    pub fn record(&self, id: &RecordId) -> Option<&Record> {
        self.store.get(id)
    }

    /// Mutable access to a stored record. Changes are visible to every later lookup.
    pub fn record_mut(&mut self, id: &RecordId) -> Option<RecordMut<'_>> {
        let name = self.name.as_str();
        self.store
            .get_full_mut(id)
            .map(|(id, record)| RecordMut::new(name, id, record))
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.store.contains(id)
    }

    /// Records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &Record> + '_ {
        self.store.iter().map(|(_, r)| r)
    }

    pub(crate) fn entries_for(&self, id: &RecordId) -> Option<(&RecordId, &Record)> {
        self.store.get_entry(id)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&RecordId, &Record)> + '_ {
        self.store.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RecordId> + '_ {
        self.store.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("records", &self.store.len())
            .field("map", &self.map)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}
