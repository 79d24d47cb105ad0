//! Application composer: wires entities, storage, auth and the HTTP engine
//! together and drives the startup sequence.
//!
//! Startup order is fixed: storage init, schema sync, auth init, auth
//! routes, global middlewares, entity routes, serve. Auth routes are
//! registered before any global middleware so rate limiting and logging
//! still apply to them through the engine's global chain.

use crate::auth::AuthProvider;
use crate::core::descriptor::EntityDescriptor;
use crate::core::entity::Entity;
use crate::core::hooks::Hooks;
use crate::core::store::StorageAdapter;
use crate::crud::config::ProtectionConfig;
use crate::crud::routes::{RegistrationError, register_crud_routes};
use crate::http::engine::{HttpEngine, Middleware};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

type BindFn = Box<
    dyn Fn(
            &mut dyn HttpEngine,
            Arc<dyn StorageAdapter>,
            Arc<EntityDescriptor>,
            &ProtectionConfig,
            Option<&dyn AuthProvider>,
        ) -> Result<(), RegistrationError>
        + Send,
>;

struct Registration {
    shape: Arc<EntityDescriptor>,
    protection: ProtectionConfig,
    bind: BindFn,
}

/// Builder for a complete application.
///
/// ```rust,no_run
/// use crudkit::app::App;
/// use crudkit::http::axum_engine::AxumEngine;
/// use crudkit::storage::memory::InMemoryStorage;
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// # struct Widget { id: u64, name: String }
/// # impl crudkit::core::entity::Entity for Widget {
/// #     const TYPE_NAME: &'static str = "widget";
/// #     type Id = u64;
/// #     fn id(&self) -> u64 { self.id }
/// #     fn set_id(&mut self, id: u64) { self.id = id; }
/// # }
/// # impl crudkit::core::hooks::Hooks for Widget {}
///
/// # async fn demo() -> anyhow::Result<()> {
/// App::new()
///     .use_storage(InMemoryStorage::new())
///     .use_http(AxumEngine::new(8080))
///     .add_entity::<Widget>()
///     .run()
///     .await
/// # }
/// ```
#[derive(Default)]
pub struct App {
    registrations: Vec<Registration>,
    adapter: Option<Arc<dyn StorageAdapter>>,
    engine: Option<Box<dyn HttpEngine>>,
    auth: Option<Arc<dyn AuthProvider>>,
    middlewares: Vec<Middleware>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity with no protected methods.
    pub fn add_entity<E: Entity + Hooks>(self) -> Self {
        self.add_protected_entity::<E>(ProtectionConfig::new())
    }

    /// Register an entity with the given per-method protection.
    pub fn add_protected_entity<E: Entity + Hooks>(mut self, protection: ProtectionConfig) -> Self {
        self.registrations.push(Registration {
            shape: EntityDescriptor::describe::<E>(),
            protection,
            bind: Box::new(|engine, store, shape, protection, auth| {
                register_crud_routes::<E>(engine, store, shape, protection, auth)
            }),
        });
        self
    }

    pub fn use_storage(mut self, adapter: impl StorageAdapter + 'static) -> Self {
        self.adapter = Some(Arc::new(adapter));
        self
    }

    pub fn use_http(mut self, engine: impl HttpEngine + 'static) -> Self {
        self.engine = Some(Box::new(engine));
        self
    }

    pub fn use_auth(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    /// Add a global middleware. Applied to every route, first added runs
    /// outermost.
    pub fn register_middleware(mut self, middleware: Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Initialize every component in order, register all routes, then
    /// serve until shutdown.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let adapter = self
            .adapter
            .take()
            .context("no storage adapter configured; call use_storage")?;
        let mut engine = self
            .engine
            .take()
            .context("no http engine configured; call use_http")?;

        adapter.init().await.context("storage init failed")?;
        info!("storage adapter initialized");

        let shapes: Vec<EntityDescriptor> = self
            .registrations
            .iter()
            .map(|r| (*r.shape).clone())
            .collect();
        adapter
            .sync_schema(&shapes)
            .await
            .context("schema sync failed")?;
        info!(entities = shapes.len(), "schema synchronized");

        if let Some(auth) = &self.auth {
            auth.init().await.context("auth init failed")?;
            auth.register_routes(engine.as_mut());
            info!("auth provider initialized");
        }

        for middleware in self.middlewares.drain(..) {
            engine.use_middleware(middleware);
        }

        for registration in &self.registrations {
            (registration.bind)(
                engine.as_mut(),
                adapter.clone(),
                registration.shape.clone(),
                &registration.protection,
                self.auth.as_deref(),
            )?;
            info!(
                entity = %registration.shape.entity_type,
                collection = %registration.shape.collection,
                protected = registration.protection.any_protected(),
                "entity routes registered"
            );
        }

        engine.start().await
    }
}

/// Install the default `tracing` subscriber, reading the filter from
/// `RUST_LOG`. Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
