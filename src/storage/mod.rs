//! Storage implementations of the collaborator traits

pub mod in_memory;

pub use in_memory::{
    InMemoryEntityStore, InMemoryFieldDefinitions, InMemoryRestConfigStore, StoredEntity,
};
