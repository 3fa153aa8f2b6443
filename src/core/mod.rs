pub mod collection;
pub mod error;
pub mod item;
pub mod query;
pub mod record;
pub mod registry;
pub mod relation;
pub mod types;
