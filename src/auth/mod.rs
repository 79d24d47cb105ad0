//! Authentication: the pluggable provider contract, the user model
//! contract, and the shipped JWT provider.

pub mod jwt;
pub mod password;

use crate::core::entity::Entity;
use crate::core::hooks::Hooks;
use crate::core::store::StorageError;
use crate::http::engine::{HttpEngine, Middleware};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use jwt::JwtAuthProvider;

/// Context key under which the authorization middleware stores the
/// authenticated subject.
pub const SUBJECT_KEY: &str = "user_id";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth secret key must not be empty")]
    MissingSecret,
    #[error("missing or invalid Authorization header")]
    MissingBearer,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("failed to hash password")]
    Hash,
    #[error("failed to sign token")]
    Signing,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Pluggable authentication provider.
///
/// A provider owns three responsibilities: one-time initialization (secret
/// validation, user schema), registering its own routes (login, register),
/// and producing the middleware that guards protected routes.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn init(&self) -> Result<(), AuthError>;

    /// Register the provider's own endpoints on the engine. These are
    /// never protected.
    fn register_routes(&self, engine: &mut dyn HttpEngine);

    /// The authorization middleware wrapped around protected handlers.
    /// Rejects with 401 unless the request carries a valid bearer token;
    /// on success the token subject is attached to the request context
    /// under [`SUBJECT_KEY`].
    fn middleware(&self) -> Middleware;
}

/// Contract a user entity must satisfy to back credential auth.
///
/// The stored password field always holds a digest, never plaintext; the
/// provider hashes at registration through [`set_password`].
///
/// [`set_password`]: AuthUser::set_password
pub trait AuthUser: Entity + Hooks {
    fn email(&self) -> &str;
    fn password(&self) -> &str;
    fn set_password(&mut self, digest: String);
}

/// Default user model, sufficient for most applications. Applications
/// needing extra profile fields implement [`AuthUser`] on their own type
/// instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(default)]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Entity for UserAccount {
    const TYPE_NAME: &'static str = "user";
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }

    fn set_id(&mut self, id: Self::Id) {
        self.id = id;
    }
}

impl Hooks for UserAccount {}

impl AuthUser for UserAccount {
    fn email(&self) -> &str {
        &self.email
    }

    fn password(&self) -> &str {
        &self.password
    }

    fn set_password(&mut self, digest: String) {
        self.password = digest;
    }
}
