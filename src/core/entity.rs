//! Entity contract: the traits an application record type implements to be
//! exposed through the CRUD surface.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The kind of an entity's identity field.
///
/// Only text and integer identities are supported; anything else simply has
/// no [`EntityId`] implementation and fails to compile at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// String-typed identity
    Text,
    /// Signed integer identity
    Int,
    /// Unsigned integer identity
    Uint,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::Text => write!(f, "text"),
            IdKind::Int => write!(f, "integer"),
            IdKind::Uint => write!(f, "unsigned integer"),
        }
    }
}

/// Error returned when transport-boundary text cannot be coerced to the
/// entity's declared identity kind.
#[derive(Debug, Clone, Error)]
#[error("invalid {kind} identity: '{raw}'")]
pub struct IdCoercionError {
    pub raw: String,
    pub kind: IdKind,
}

/// An already-coerced identity value, as passed to storage adapters.
///
/// Coercion from request text happens in the handlers (see
/// [`IdValue::coerce`]); adapters never see raw path text.
#[derive(Debug, Clone, PartialEq)]
pub enum IdValue {
    Text(String),
    Int(i64),
    Uint(u64),
}

impl IdValue {
    /// Coerce request text into an identity of the given kind.
    ///
    /// Fails closed: malformed text is rejected, never truncated. Empty text
    /// is rejected for text identities as well, since no stored record can
    /// carry an empty key.
    pub fn coerce(raw: &str, kind: IdKind) -> Result<Self, IdCoercionError> {
        let err = || IdCoercionError {
            raw: raw.to_string(),
            kind,
        };
        match kind {
            IdKind::Text => {
                if raw.is_empty() {
                    Err(err())
                } else {
                    Ok(IdValue::Text(raw.to_string()))
                }
            }
            IdKind::Int => raw.parse::<i64>().map(IdValue::Int).map_err(|_| err()),
            IdKind::Uint => raw.parse::<u64>().map(IdValue::Uint).map_err(|_| err()),
        }
    }

    /// The kind of this value.
    pub fn kind(&self) -> IdKind {
        match self {
            IdValue::Text(_) => IdKind::Text,
            IdValue::Int(_) => IdKind::Int,
            IdValue::Uint(_) => IdKind::Uint,
        }
    }

    /// Render as a JSON value, matching the representation of the identity
    /// field inside a serialized entity document.
    pub fn to_json(&self) -> Value {
        match self {
            IdValue::Text(s) => Value::String(s.clone()),
            IdValue::Int(i) => Value::from(*i),
            IdValue::Uint(u) => Value::from(*u),
        }
    }

    /// Canonical string form, used by adapters as a storage key.
    pub fn canonical(&self) -> String {
        match self {
            IdValue::Text(s) => s.clone(),
            IdValue::Int(i) => i.to_string(),
            IdValue::Uint(u) => u.to_string(),
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Types usable as an entity identity field.
///
/// Implemented for `String` and the common integer widths. Declaring any
/// other identity type on an [`Entity`] is rejected by the compiler, which is
/// where "unsupported identity type" surfaces in this crate.
pub trait EntityId: Clone + Send + Sync + 'static {
    /// The kind recorded in the entity's descriptor.
    const KIND: IdKind;

    /// Parse transport-boundary text. Must fail closed on malformed input.
    fn from_text(raw: &str) -> Result<Self, IdCoercionError>;

    /// Convert to the adapter-facing erased representation.
    fn to_value(&self) -> IdValue;
}

impl EntityId for String {
    const KIND: IdKind = IdKind::Text;

    fn from_text(raw: &str) -> Result<Self, IdCoercionError> {
        match IdValue::coerce(raw, Self::KIND)? {
            IdValue::Text(s) => Ok(s),
            _ => unreachable!(),
        }
    }

    fn to_value(&self) -> IdValue {
        IdValue::Text(self.clone())
    }
}

macro_rules! impl_int_entity_id {
    ($ty:ty, $kind:expr, $variant:ident, $wide:ty) => {
        impl EntityId for $ty {
            const KIND: IdKind = $kind;

            fn from_text(raw: &str) -> Result<Self, IdCoercionError> {
                raw.parse::<$ty>().map_err(|_| IdCoercionError {
                    raw: raw.to_string(),
                    kind: Self::KIND,
                })
            }

            fn to_value(&self) -> IdValue {
                IdValue::$variant(*self as $wide)
            }
        }
    };
}

impl_int_entity_id!(i64, IdKind::Int, Int, i64);
impl_int_entity_id!(i32, IdKind::Int, Int, i64);
impl_int_entity_id!(u64, IdKind::Uint, Uint, u64);
impl_int_entity_id!(u32, IdKind::Uint, Uint, u64);

/// Base trait for all entities exposed through the CRUD surface.
///
/// An entity is a plain serde-able record with exactly one identity field.
/// The engine never owns entities; it constructs transient instances for the
/// duration of a request (`Default` gives the fresh zero-valued instance the
/// handlers start from).
///
/// # Example
///
/// ```rust
/// use crudkit::core::entity::Entity;
/// use crudkit::core::hooks::Hooks;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// struct Article {
///     id: u64,
///     title: String,
/// }
///
/// impl Entity for Article {
///     const TYPE_NAME: &'static str = "article";
///     type Id = u64;
///
///     fn id(&self) -> Self::Id {
///         self.id
///     }
///
///     fn set_id(&mut self, id: Self::Id) {
///         self.id = id;
///     }
/// }
///
/// impl Hooks for Article {}
/// ```
pub trait Entity:
    Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Singular type name, lower-case (e.g. "user"). Pluralized and mounted
    /// as the collection path at registration.
    const TYPE_NAME: &'static str;

    /// Name of the identity field in the serialized representation.
    const ID_FIELD: &'static str = "id";

    /// Declared identity type (text or integer).
    type Id: EntityId;

    /// Current identity value.
    fn id(&self) -> Self::Id;

    /// Overwrite the identity field. Used by the update handler to force the
    /// path identity over whatever the request body carried.
    fn set_id(&mut self, id: Self::Id);
}
