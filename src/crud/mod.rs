//! CRUD generation: the six canonical handlers, the per-entity protection
//! configuration, and the route registrar.

pub mod config;
pub mod handlers;
pub mod routes;

pub use config::{CRUD_METHODS, ProtectionConfig};
pub use routes::{RegistrationError, register_crud_routes};
