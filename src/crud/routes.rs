//! Route registrar: binds the six CRUD handlers to REST paths for one
//! entity, wrapping protected methods with the auth provider's middleware.

use crate::auth::AuthProvider;
use crate::core::descriptor::EntityDescriptor;
use crate::core::entity::Entity;
use crate::core::hooks::Hooks;
use crate::core::store::StorageAdapter;
use crate::crud::config::ProtectionConfig;
use crate::crud::handlers;
use crate::http::engine::{Handler, HttpEngine, Middleware, Route, handler};
use axum::http::Method;
use std::sync::Arc;
use thiserror::Error;

/// Registration-time configuration failures.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// A method was marked protected with no auth provider configured.
    /// Failing loudly here replaces the silently inert protection of
    /// earlier designs (see DESIGN.md).
    #[error("{method} on /{collection} is marked protected but no auth provider is configured")]
    ProtectedWithoutAuthProvider {
        method: Method,
        collection: String,
    },
}

/// Register the full CRUD surface for one entity.
///
/// Paths are derived from the descriptor's collection name:
///
/// | Method | Path              | Handler |
/// |--------|-------------------|---------|
/// | GET    | /collection       | list    |
/// | GET    | /collection/:id   | get     |
/// | POST   | /collection       | create  |
/// | PUT    | /collection/:id   | update  |
/// | PATCH  | /collection/:id   | patch   |
/// | DELETE | /collection/:id   | delete  |
///
/// Protected methods are wrapped with the authorization middleware before
/// registration, so the 401 short-circuit happens before the CRUD handler
/// runs.
pub fn register_crud_routes<E: Entity + Hooks>(
    engine: &mut dyn HttpEngine,
    store: Arc<dyn StorageAdapter>,
    shape: Arc<EntityDescriptor>,
    protection: &ProtectionConfig,
    auth: Option<&dyn AuthProvider>,
) -> Result<(), RegistrationError> {
    let base = shape.base_path();
    let item = format!("{}/:id", base);
    let auth_middleware: Option<Middleware> = auth.map(|provider| provider.middleware());

    let mut bind = |method: Method, path: &str, route_handler: Handler| {
        let protected = protection.is_protected(&method);
        let route_handler = if protected {
            match &auth_middleware {
                Some(middleware) => middleware(route_handler),
                None => {
                    return Err(RegistrationError::ProtectedWithoutAuthProvider {
                        method,
                        collection: shape.collection.clone(),
                    });
                }
            }
        } else {
            route_handler
        };
        engine.register_route(
            Route {
                method,
                path: path.to_string(),
                entity: shape.collection.clone(),
                protected,
            },
            route_handler,
        );
        Ok(())
    };

    let list = {
        let (shape, store) = (shape.clone(), store.clone());
        handler(move |req| handlers::handle_list(req, shape.clone(), store.clone()))
    };
    bind(Method::GET, &base, list)?;

    let get = {
        let (shape, store) = (shape.clone(), store.clone());
        handler(move |req| handlers::handle_get(req, shape.clone(), store.clone()))
    };
    bind(Method::GET, &item, get)?;

    let create = {
        let (shape, store) = (shape.clone(), store.clone());
        handler(move |req| handlers::handle_create::<E>(req, shape.clone(), store.clone()))
    };
    bind(Method::POST, &base, create)?;

    let update = {
        let (shape, store) = (shape.clone(), store.clone());
        handler(move |req| handlers::handle_update::<E>(req, shape.clone(), store.clone()))
    };
    bind(Method::PUT, &item, update)?;

    let patch = {
        let (shape, store) = (shape.clone(), store.clone());
        handler(move |req| handlers::handle_patch::<E>(req, shape.clone(), store.clone()))
    };
    bind(Method::PATCH, &item, patch)?;

    let delete = {
        let (shape, store) = (shape.clone(), store.clone());
        handler(move |req| handlers::handle_delete::<E>(req, shape.clone(), store.clone()))
    };
    bind(Method::DELETE, &item, delete)?;

    Ok(())
}
