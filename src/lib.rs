//! # crudkit
//!
//! Generate a complete REST CRUD surface from plain Rust entity types.
//!
//! Declare an entity, register it with the [`app::App`] builder, and the
//! framework derives the collection routes, the six canonical handlers,
//! the storage calls and the JSON envelope:
//!
//! - **Entities**: any `Serialize + Deserialize + Default` type with a
//!   declared identity field ([`core::entity::Entity`]).
//! - **Handlers**: list, get, create, update, patch and delete with
//!   filtering, sorting and pagination ([`crud::handlers`]).
//! - **Hooks**: per-entity lifecycle callbacks that can veto writes
//!   ([`core::hooks`]).
//! - **Storage**: pluggable adapter contract ([`core::store`]) with a
//!   shipped in-memory implementation ([`storage::memory`]).
//! - **Transport**: pluggable engine contract ([`http::engine`]) with a
//!   shipped axum binding ([`http::axum_engine`]).
//! - **Auth**: JWT register/login plus a bearer middleware for protected
//!   methods ([`auth::jwt`]).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use crudkit::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct Company {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl Entity for Company {
//!     const TYPE_NAME: &'static str = "company";
//!     type Id = u64;
//!
//!     fn id(&self) -> u64 {
//!         self.id
//!     }
//!
//!     fn set_id(&mut self, id: u64) {
//!         self.id = id;
//!     }
//! }
//!
//! impl Hooks for Company {}
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     crudkit::app::init_tracing();
//!     App::new()
//!         .use_storage(InMemoryStorage::new())
//!         .use_http(AxumEngine::new(8080))
//!         .add_entity::<Company>()
//!         .run()
//!         .await
//! }
//! ```
//!
//! The snippet serves `GET/POST /companies` and
//! `GET/PUT/PATCH/DELETE /companies/:id`.

pub mod app;
pub mod auth;
pub mod core;
pub mod crud;
pub mod http;
pub mod storage;

/// The types most applications need, in one import.
pub mod prelude {
    pub use crate::app::App;
    pub use crate::auth::{AuthProvider, AuthUser, JwtAuthProvider, UserAccount};
    pub use crate::core::entity::Entity;
    pub use crate::core::hooks::{Hook, HookError, HookResult, HookSet, Hooks};
    pub use crate::core::store::{StorageAdapter, StorageError};
    pub use crate::crud::config::ProtectionConfig;
    pub use crate::http::axum_engine::AxumEngine;
    pub use crate::http::engine::{Handler, HttpEngine, Middleware, Route};
    pub use crate::storage::memory::InMemoryStorage;
}
