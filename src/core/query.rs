// collection lookups: by id, by id list, by predicate, by field criteria
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::item::Item;
use crate::core::record::Record;
use crate::core::registry::CollectionRef;
use crate::core::types::RecordId;

/// The shape of a lookup against one collection.
pub enum Query<'q> {
    /// One record, or nothing.
    Id(RecordId),
    /// One slot per id, in order. Unknown ids leave `None` in their slot.
    Ids(Vec<RecordId>),
    /// Every record the predicate accepts, in insertion order.
    Filter(Box<dyn Fn(&Item<'_>) -> bool + 'q>),
    /// Every record whose fields equal all criteria, in insertion order.
    Where(Criteria),
}

impl<'q> Query<'q> {
    pub fn filter<F>(predicate: F) -> Self
    where
        F: Fn(&Item<'_>) -> bool + 'q,
    {
        Query::Filter(Box::new(predicate))
    }
}

impl fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Query::Ids(ids) => f.debug_tuple("Ids").field(ids).finish(),
            Query::Filter(_) => f.write_str("Filter(..)"),
            Query::Where(criteria) => f.debug_tuple("Where").field(criteria).finish(),
        }
    }
}

impl From<RecordId> for Query<'_> {
    fn from(id: RecordId) -> Self {
        Query::Id(id)
    }
}

impl From<i64> for Query<'_> {
    fn from(id: i64) -> Self {
        Query::Id(id.into())
    }
}

impl From<i32> for Query<'_> {
    fn from(id: i32) -> Self {
        Query::Id(id.into())
    }
}

impl From<&str> for Query<'_> {
    fn from(id: &str) -> Self {
        Query::Id(id.into())
    }
}

impl From<Vec<RecordId>> for Query<'_> {
    fn from(ids: Vec<RecordId>) -> Self {
        Query::Ids(ids)
    }
}

impl From<Vec<i64>> for Query<'_> {
    fn from(ids: Vec<i64>) -> Self {
        Query::Ids(ids.into_iter().map(RecordId::from).collect())
    }
}

impl From<Criteria> for Query<'_> {
    fn from(criteria: Criteria) -> Self {
        Query::Where(criteria)
    }
}

/// Field -> value equality constraints.
///
/// Matching is strict: scalars compare by value (`1` matches `1.0`), while arrays and
/// objects never match, even against an identical value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria {
    fields: IndexMap<String, Value>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.fields.iter().all(|(name, expected)| {
            record
                .field(name)
                .is_some_and(|actual| strict_eq(actual, expected))
        })
    }
}

impl FromIterator<(String, Value)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl From<&Map<String, Value>> for Criteria {
    fn from(fields: &Map<String, Value>) -> Self {
        fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => false,
    }
}

/// Result of a collection lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Found<'r> {
    Item(Option<Item<'r>>),
    Items(Vec<Option<Item<'r>>>),
}

impl<'r> Found<'r> {
    pub fn is_many(&self) -> bool {
        matches!(self, Found::Items(_))
    }

    /// The single item, if this was a single lookup that hit.
    pub fn into_item(self) -> Option<Item<'r>> {
        match self {
            Found::Item(item) => item,
            Found::Items(_) => None,
        }
    }

    /// All slots; a single lookup becomes a one-element list.
    pub fn into_items(self) -> Vec<Option<Item<'r>>> {
        match self {
            Found::Item(item) => vec![item],
            Found::Items(items) => items,
        }
    }

    /// Present items only.
    pub fn present(self) -> Vec<Item<'r>> {
        self.into_items().into_iter().flatten().collect()
    }

    pub fn ids(&self) -> Vec<Option<&'r RecordId>> {
        match self {
            Found::Item(item) => vec![item.map(|i| i.id())],
            Found::Items(items) => items.iter().map(|slot| slot.map(|i| i.id())).collect(),
        }
    }
}

impl<'r> CollectionRef<'r> {
    /// Lookup over any [`Query`] shape. Never fails: misses show up as `None`.
    pub fn get<'q>(&self, query: impl Into<Query<'q>>) -> Found<'r> {
        match query.into() {
            Query::Id(id) => Found::Item(self.item(&id)),
            Query::Ids(ids) => Found::Items(self.items(&ids)),
            Query::Filter(predicate) => {
                Found::Items(self.filter(predicate).into_iter().map(Some).collect())
            }
            Query::Where(criteria) => {
                Found::Items(self.find(&criteria).into_iter().map(Some).collect())
            }
        }
    }

    pub fn item(&self, id: &RecordId) -> Option<Item<'r>> {
        let collection = self.collection;
        collection
            .entries_for(id)
            .map(|(id, record)| Item::new(self.registry, collection, id, record))
    }

    pub fn items(&self, ids: &[RecordId]) -> Vec<Option<Item<'r>>> {
        ids.iter().map(|id| self.item(id)).collect()
    }

    pub fn filter(&self, predicate: impl Fn(&Item<'_>) -> bool) -> Vec<Item<'r>> {
        self.iter().filter(|item| predicate(item)).collect()
    }

    pub fn find(&self, criteria: &Criteria) -> Vec<Item<'r>> {
        self.iter().filter(|item| criteria.matches(item.record())).collect()
    }

    /// Every item in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Item<'r>> + use<'r> {
        let registry = self.registry;
        let collection = self.collection;
        collection
            .entries()
            .map(move |(id, record)| Item::new(registry, collection, id, record))
    }
}
