//! Core module containing fundamental traits and types for the framework

pub mod descriptor;
pub mod entity;
pub mod hooks;
pub mod pluralize;
pub mod query;
pub mod store;

pub use descriptor::EntityDescriptor;
pub use entity::{Entity, EntityId, IdCoercionError, IdKind, IdValue};
pub use hooks::{Hook, HookError, HookResult, HookSet, Hooks};
pub use query::{Pagination, QueryDescription, Sort, SortDirection};
pub use store::{StorageAdapter, StorageError};
