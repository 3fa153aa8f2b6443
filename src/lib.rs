//! In-memory object-graph linker.
//!
//! Flat datasets are loaded into named collections of records. A record field that names
//! another collection (directly, or through a collection's relation map) is followed on
//! demand through [`Item::get`], so the graph is never materialized up front.

pub mod core;
pub mod mapping;

pub use crate::core::collection::{Collection, CollectionOptions, Transform};
pub use crate::core::error::{LinkError, LinkResult};
pub use crate::core::item::{Field, Item, Relation, RelationTarget};
pub use crate::core::query::{Criteria, Found, Query};
pub use crate::core::record::{Record, RecordMut};
pub use crate::core::registry::{CollectionRef, Registry};
pub use crate::core::relation::RelationMap;
pub use crate::core::types::{ID_FIELD, RecordId};
pub use crate::mapping::config::LinkerConfig;
pub use crate::mapping::dataset::Dataset;
