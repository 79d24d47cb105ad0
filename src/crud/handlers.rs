//! The six canonical CRUD handlers, generic over an entity's registered
//! descriptor.
//!
//! Common shape: decode input, coerce the path identity to the declared
//! kind, invoke before-hooks (which may veto), call the storage adapter,
//! invoke after-hooks (reported but never rolled back), encode output.
//!
//! Identity coercion failures answer 404 rather than 400: a malformed
//! identity can never match a stored record, and the API keeps uniform
//! not-found semantics (see DESIGN.md).

use crate::core::descriptor::EntityDescriptor;
use crate::core::entity::{Entity, EntityId, IdValue};
use crate::core::hooks::{self, Hook, HookError, Hooks};
use crate::core::query::QueryDescription;
use crate::core::store::{StorageAdapter, StorageError};
use crate::http::request::Request;
use crate::http::response::Response;
use axum::http::StatusCode;
use serde_json::Value;
use std::sync::Arc;

/// Translate an adapter failure into the API error envelope.
///
/// Conflict is deliberately not distinguished from a generic backend
/// failure at this surface.
fn storage_response(err: StorageError) -> Response {
    match err {
        StorageError::NotFound => Response::error(StatusCode::NOT_FOUND, "entity not found"),
        other => Response::error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

fn hook_failure(hook: Hook, err: HookError) -> Response {
    Response::error(
        StatusCode::BAD_REQUEST,
        format!("{} failed: {}", hook.name(), err.message),
    )
}

/// Coerce the `:id` path parameter to the entity's declared identity kind.
fn path_id(req: &Request, shape: &EntityDescriptor) -> Result<IdValue, Response> {
    let raw = req.param("id").unwrap_or("");
    IdValue::coerce(raw, shape.id_kind)
        .map_err(|_| Response::error(StatusCode::NOT_FOUND, "entity not found"))
}

fn encode<E: Entity>(entity: &E) -> Result<Value, Response> {
    serde_json::to_value(entity).map_err(|err| {
        Response::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to encode entity: {}", err),
        )
    })
}

/// GET /collection: list with filters, sort and pagination.
pub async fn handle_list(
    req: Request,
    shape: Arc<EntityDescriptor>,
    store: Arc<dyn StorageAdapter>,
) -> Response {
    let query = QueryDescription::from_params(req.query_params());
    match store.find_all(&shape, &query).await {
        Ok(records) => Response::json(StatusCode::OK, &records),
        Err(err) => storage_response(err),
    }
}

/// GET /collection/:id: fetch one.
pub async fn handle_get(
    req: Request,
    shape: Arc<EntityDescriptor>,
    store: Arc<dyn StorageAdapter>,
) -> Response {
    let id = match path_id(&req, &shape) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match store.find_by_id(&id, &shape).await {
        Ok(record) => Response::json(StatusCode::OK, &record),
        Err(err) => storage_response(err),
    }
}

/// POST /collection: create from the request body.
pub async fn handle_create<E: Entity + Hooks>(
    req: Request,
    shape: Arc<EntityDescriptor>,
    store: Arc<dyn StorageAdapter>,
) -> Response {
    let mut entity: E = match req.json() {
        Ok(entity) => entity,
        Err(err) => {
            return Response::error(StatusCode::BAD_REQUEST, format!("invalid input: {}", err));
        }
    };

    if let Err(err) = hooks::invoke(&mut entity, shape.hooks, Hook::BeforeCreate) {
        return hook_failure(Hook::BeforeCreate, err);
    }

    let record = match encode(&entity) {
        Ok(record) => record,
        Err(resp) => return resp,
    };
    if let Err(err) = store.create(&shape, record).await {
        return storage_response(err);
    }

    // The create already committed; a failing after-hook is reported but
    // nothing is rolled back.
    if let Err(err) = hooks::invoke(&mut entity, shape.hooks, Hook::AfterCreate) {
        return hook_failure(Hook::AfterCreate, err);
    }

    Response::json(StatusCode::CREATED, &entity)
}

/// PUT /collection/:id: full replace; the path identity overrides whatever
/// the body carried.
pub async fn handle_update<E: Entity + Hooks>(
    req: Request,
    shape: Arc<EntityDescriptor>,
    store: Arc<dyn StorageAdapter>,
) -> Response {
    let raw = req.param("id").unwrap_or("");
    let id = match E::Id::from_text(raw) {
        Ok(id) => id,
        Err(_) => return Response::error(StatusCode::NOT_FOUND, "entity not found"),
    };

    let mut entity: E = match req.json() {
        Ok(entity) => entity,
        Err(err) => {
            return Response::error(StatusCode::BAD_REQUEST, format!("invalid input: {}", err));
        }
    };
    entity.set_id(id);

    if let Err(err) = hooks::invoke(&mut entity, shape.hooks, Hook::BeforeUpdate) {
        return hook_failure(Hook::BeforeUpdate, err);
    }

    let record = match encode(&entity) {
        Ok(record) => record,
        Err(resp) => return resp,
    };
    if let Err(err) = store.update(&shape, record).await {
        return storage_response(err);
    }

    if let Err(err) = hooks::invoke(&mut entity, shape.hooks, Hook::AfterUpdate) {
        return hook_failure(Hook::AfterUpdate, err);
    }

    Response::json(StatusCode::OK, &entity)
}

/// PATCH /collection/:id: partial merge onto the stored record.
pub async fn handle_patch<E: Entity + Hooks>(
    req: Request,
    shape: Arc<EntityDescriptor>,
    store: Arc<dyn StorageAdapter>,
) -> Response {
    let id = match path_id(&req, &shape) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let existing = match store.find_by_id(&id, &shape).await {
        Ok(record) => record,
        Err(err) => return storage_response(err),
    };

    let patch: serde_json::Map<String, Value> = match req.json() {
        Ok(patch) => patch,
        Err(_) => return Response::error(StatusCode::BAD_REQUEST, "invalid patch data"),
    };

    // The patch hooks see the record as loaded, before the merge.
    let mut loaded: E = match serde_json::from_value(existing.clone()) {
        Ok(entity) => entity,
        Err(err) => {
            return Response::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("stored record does not match entity shape: {}", err),
            );
        }
    };

    let mut merged = existing;
    if let Value::Object(fields) = &mut merged {
        for (key, value) in patch {
            fields.insert(key, value);
        }
    }

    if let Err(err) = hooks::invoke(&mut loaded, shape.hooks, Hook::BeforePatch) {
        return hook_failure(Hook::BeforePatch, err);
    }

    if let Err(err) = store.update(&shape, merged.clone()).await {
        return storage_response(err);
    }

    if let Err(err) = hooks::invoke(&mut loaded, shape.hooks, Hook::AfterPatch) {
        return hook_failure(Hook::AfterPatch, err);
    }

    Response::json(StatusCode::OK, &merged)
}

/// DELETE /collection/:id: remove one, 204 on success.
///
/// The delete hooks run on a fresh zero-valued instance, not the stored
/// record; a hook needing the record must fetch it itself.
pub async fn handle_delete<E: Entity + Hooks>(
    req: Request,
    shape: Arc<EntityDescriptor>,
    store: Arc<dyn StorageAdapter>,
) -> Response {
    let id = match path_id(&req, &shape) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut scratch = E::default();

    if let Err(err) = hooks::invoke(&mut scratch, shape.hooks, Hook::BeforeDelete) {
        return hook_failure(Hook::BeforeDelete, err);
    }

    if let Err(err) = store.delete(&id, &shape).await {
        return storage_response(err);
    }

    if let Err(err) = hooks::invoke(&mut scratch, shape.hooks, Hook::AfterDelete) {
        return hook_failure(Hook::AfterDelete, err);
    }

    Response::no_content()
}
