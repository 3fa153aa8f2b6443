/*
Bulk input for a registry.

    collection name -> list of records

Collections are created in the order they appear in the input, each one picking up the
transform and relation map configured for its name. Text inputs:

    TOON (same shape as the JSON form)
    JSON  { "artists": [ {..}, {..} ], "songs": [ .. ] }
*/
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::collection::CollectionOptions;
use crate::core::error::{LinkError, LinkResult};
use crate::core::record::Record;
use crate::core::registry::Registry;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    collections: IndexMap<String, Vec<Record>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a collection. A name given twice keeps its first position and the later
    /// records.
    pub fn with<I>(mut self, name: impl Into<String>, records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        self.collections.insert(name.into(), records.into_iter().collect());
        self
    }

    pub fn from_value(value: Value) -> LinkResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json(text: &str) -> LinkResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_toon(text: &str) -> LinkResult<Self> {
        let value: Value =
            toon_format::decode_default(text).map_err(|e| LinkError::Decode(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.collections.keys().map(String::as_str)
    }

    pub fn records(&self, name: &str) -> Option<&[Record]> {
        self.collections.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl IntoIterator for Dataset {
    type Item = (String, Vec<Record>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<Record>>;

    fn into_iter(self) -> Self::IntoIter {
        self.collections.into_iter()
    }
}

impl Registry {
    /// Creates one collection per dataset entry and imports its records.
    ///
    /// Stops at the first error: a name that is already registered
    /// ([`LinkError::AlreadyExists`]) or a failing record. Collections and records
    /// created before the failure stay registered.
    pub fn import(&mut self, dataset: Dataset) -> LinkResult<()> {
        for (name, records) in dataset {
            debug!(collection = %name, records = records.len(), "importing collection");
            self.create(&name, CollectionOptions::new())?.import(records)?;
        }
        Ok(())
    }
}
