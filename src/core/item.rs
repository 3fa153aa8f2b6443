// item = a stored record seen through its owning collection
//
// relation values are resolved on every access; nothing is cached, so a field changed
// through Collection::record_mut is picked up by the next get()
use std::fmt;
use std::ptr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::core::collection::Collection;
use crate::core::error::LinkResult;
use crate::core::query::{Criteria, Found};
use crate::core::record::Record;
use crate::core::registry::Registry;
use crate::core::types::RecordId;

/// A record bound to its collection and registry, able to follow relations.
#[derive(Clone, Copy)]
pub struct Item<'r> {
    registry: &'r Registry,
    collection: &'r Collection,
    id: &'r RecordId,
    record: &'r Record,
}

/// Outcome of [`Item::get`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field<'r> {
    /// The record has no such field.
    Absent,
    /// Plain field value.
    Value(&'r Value),
    /// The field refers to another collection.
    Related(Found<'r>),
}

impl<'r> Item<'r> {
    pub(crate) fn new(
        registry: &'r Registry,
        collection: &'r Collection,
        id: &'r RecordId,
        record: &'r Record,
    ) -> Self {
        Self {
            registry,
            collection,
            id,
            record,
        }
    }

    pub fn id(&self) -> &'r RecordId {
        self.id
    }

    pub fn record(&self) -> &'r Record {
        self.record
    }

    pub fn collection(&self) -> &'r Collection {
        self.collection
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Raw field value, never following relations.
    pub fn field(&self, key: &str) -> Option<&'r Value> {
        self.record.field(key)
    }

    /// Reads `key`, following it into another collection when it is a relation.
    ///
    /// A scalar id yields a single (possibly missing) item, a list of ids yields one
    /// slot per id. A relation pointing at an unregistered collection reads as
    /// [`Field::Absent`]; use [`Item::try_get`] to see that as an error.
    pub fn get(&self, key: &str) -> Field<'r> {
        self.try_get(key).unwrap_or_else(|err| {
            warn!(
                collection = self.collection.name(),
                field = key,
                %err,
                "relation target missing"
            );
            Field::Absent
        })
    }

    pub fn try_get(&self, key: &str) -> LinkResult<Field<'r>> {
        let Some(value) = self.record.field(key) else {
            return Ok(Field::Absent);
        };

        match self.registry.resolve_target(self.collection, key) {
            Some(target) => {
                let found = follow(self.registry, target, &RelationTarget::from_value(value))?;
                Ok(Field::Related(found))
            }
            None => Ok(Field::Value(value)),
        }
    }

    /// Detached handle to the relation behind `key`, or `None` if `key` is absent or a
    /// plain field. The handle keeps the ids as they are now and can be resolved later.
    pub fn relation(&self, key: &str) -> Option<Relation> {
        let value = self.record.field(key)?;
        let target = self.registry.resolve_target(self.collection, key)?;
        Some(Relation {
            collection: target.to_string(),
            target: RelationTarget::from_value(value),
        })
    }
}

impl PartialEq for Item<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.collection, other.collection) && ptr::eq(self.record, other.record)
    }
}

impl fmt::Debug for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("collection", &self.collection.name())
            .field("record", self.record)
            .finish()
    }
}

impl<'r> Field<'r> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn value(&self) -> Option<&'r Value> {
        match self {
            Field::Value(value) => Some(*value),
            _ => None,
        }
    }

    /// The related item of a single-valued relation.
    pub fn item(&self) -> Option<Item<'r>> {
        match self {
            Field::Related(Found::Item(item)) => *item,
            _ => None,
        }
    }

    /// Slots of a relation, one per id. Empty for plain and absent fields.
    pub fn items(&self) -> Vec<Option<Item<'r>>> {
        match self {
            Field::Related(found) => found.clone().into_items(),
            _ => Vec::new(),
        }
    }

    /// Continues a navigation chain through a single related item.
    pub fn get(&self, key: &str) -> Field<'r> {
        match self.item() {
            Some(item) => item.get(key),
            None => Field::Absent,
        }
    }
}

/// What a relation field points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationTarget {
    /// A scalar field. `None` when the value is not a usable id.
    One(Option<RecordId>),
    /// A list field, one slot per element.
    Many(Vec<Option<RecordId>>),
    /// An object field, read as field criteria against the target collection.
    Where(Criteria),
}

impl RelationTarget {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(values) => {
                RelationTarget::Many(values.iter().map(RecordId::from_value).collect())
            }
            Value::Object(fields) => RelationTarget::Where(Criteria::from(fields)),
            other => RelationTarget::One(RecordId::from_value(other)),
        }
    }
}

/// A reference into a named collection, resolved on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub collection: String,
    pub target: RelationTarget,
}

impl Relation {
    pub fn new(collection: impl Into<String>, id: impl Into<RecordId>) -> Self {
        Self {
            collection: collection.into(),
            target: RelationTarget::One(Some(id.into())),
        }
    }

    pub fn many<I, T>(collection: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RecordId>,
    {
        Self {
            collection: collection.into(),
            target: RelationTarget::Many(ids.into_iter().map(|id| Some(id.into())).collect()),
        }
    }

    /// Looks the ids up in `registry`. Fails only if the collection is not registered.
    pub fn get<'r>(&self, registry: &'r Registry) -> LinkResult<Found<'r>> {
        follow(registry, &self.collection, &self.target)
    }
}

fn follow<'r>(
    registry: &'r Registry,
    collection: &str,
    target: &RelationTarget,
) -> LinkResult<Found<'r>> {
    let collection = registry.collection(collection)?;
    let lookup = |id: &Option<RecordId>| id.as_ref().and_then(|id| collection.item(id));
    Ok(match target {
        RelationTarget::One(id) => Found::Item(lookup(id)),
        RelationTarget::Many(ids) => Found::Items(ids.iter().map(lookup).collect()),
        RelationTarget::Where(criteria) => {
            Found::Items(collection.find(criteria).into_iter().map(Some).collect())
        }
    })
}
