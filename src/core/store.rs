//! Storage adapter contract: the backend-neutral persistence operations the
//! CRUD handlers depend on.
//!
//! Adapters are entity-type-agnostic. Records cross the boundary as
//! `serde_json::Value` documents plus the registering entity's descriptor;
//! identities arrive already coerced to the declared kind ([`IdValue`]), so
//! an adapter never parses transport text.

use crate::core::descriptor::EntityDescriptor;
use crate::core::entity::IdValue;
use crate::core::query::QueryDescription;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend connectivity could not be established at startup.
    #[error("storage connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema synchronization failed. Schemaless backends must report
    /// success instead.
    #[error("schema sync failed: {0}")]
    SchemaFailed(String),

    /// Create collided with an existing record.
    #[error("record already exists: {0}")]
    Conflict(String),

    /// No record matches the given identity.
    #[error("entity not found")]
    NotFound,

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Backend-neutral persistence contract.
///
/// Implementations must be safe to share across concurrent requests; the
/// engine holds one adapter for the lifetime of the application.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Establish backend connectivity. Called once at startup, before any
    /// other operation.
    async fn init(&self) -> Result<(), StorageError>;

    /// Synchronize backend schema with the registered entity shapes.
    ///
    /// Idempotent: calling repeatedly with the same set must succeed.
    /// Backends without a schema concept treat this as a no-op success.
    async fn sync_schema(&self, shapes: &[EntityDescriptor]) -> Result<(), StorageError>;

    /// Persist a new record. [`StorageError::Conflict`] when the identity is
    /// already taken.
    async fn create(&self, shape: &EntityDescriptor, record: Value) -> Result<(), StorageError>;

    /// Replace the record whose identity matches the record's identity
    /// field. [`StorageError::NotFound`] when no such record exists.
    async fn update(&self, shape: &EntityDescriptor, record: Value) -> Result<(), StorageError>;

    /// Remove a record by identity. [`StorageError::NotFound`] when absent.
    async fn delete(&self, id: &IdValue, shape: &EntityDescriptor) -> Result<(), StorageError>;

    /// Fetch all records matching the query. Filters are exact-match and
    /// AND-combined; sort applies in listed field order; a pagination limit
    /// of 0 means unbounded. An empty result is `Ok(vec![])`, not an error.
    async fn find_all(
        &self,
        shape: &EntityDescriptor,
        query: &QueryDescription,
    ) -> Result<Vec<Value>, StorageError>;

    /// Fetch one record by identity. [`StorageError::NotFound`] when absent.
    async fn find_by_id(
        &self,
        id: &IdValue,
        shape: &EntityDescriptor,
    ) -> Result<Value, StorageError>;
}
