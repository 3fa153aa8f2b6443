// records + the per-collection record store
use std::ops::Deref;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{LinkError, LinkResult};
use crate::core::types::{ID_FIELD, RecordId};

/// A single data item: a mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON object. Any other value yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Builder-style field insertion.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn id(&self) -> Option<RecordId> {
        self.fields.get(ID_FIELD).and_then(RecordId::from_value)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    //free mutation is only possible before the record is added to a collection
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Mutable access to a stored record. Every field except `id` may change.
pub struct RecordMut<'a> {
    collection: &'a str,
    id: &'a RecordId,
    record: &'a mut Record,
}

impl<'a> RecordMut<'a> {
    pub(crate) fn new(collection: &'a str, id: &'a RecordId, record: &'a mut Record) -> Self {
        Self { collection, id, record }
    }

    fn guard(&self, field: &str) -> LinkResult<()> {
        if field == ID_FIELD {
            return Err(LinkError::ImmutableIdentifier {
                collection: self.collection.to_string(),
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    pub fn set(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> LinkResult<Option<Value>> {
        let field = field.into();
        self.guard(&field)?;
        Ok(self.record.set(field, value))
    }

    pub fn remove(&mut self, field: &str) -> LinkResult<Option<Value>> {
        self.guard(field)?;
        Ok(self.record.remove(field))
    }
}

impl Deref for RecordMut<'_> {
    type Target = Record;

    fn deref(&self) -> &Record {
        &*self.record
    }
}

/// Insertion-ordered mapping from id to record.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: IndexMap<RecordId, Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.records.contains_key(id)
    }

    //never overwrites: a taken id hands the record back to the caller
    pub fn insert(&mut self, id: RecordId, record: Record) -> Result<&Record, (RecordId, Record)> {
        match self.records.entry(id) {
            Entry::Occupied(e) => Err((e.key().clone(), record)),
            Entry::Vacant(e) => Ok(&*e.insert(record)),
        }
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn get_entry(&self, id: &RecordId) -> Option<(&RecordId, &Record)> {
        self.records.get_key_value(id)
    }

    pub fn get_full_mut(&mut self, id: &RecordId) -> Option<(&RecordId, &mut Record)> {
        self.records.get_full_mut(id).map(|(_, k, v)| (k, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &Record)> + '_ {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
