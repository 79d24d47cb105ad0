//! JWT auth provider: registration and login endpoints plus the bearer
//! middleware, backed by whatever storage adapter the application uses.
//!
//! Tokens are HS256, carrying the user identity as `sub` and an absolute
//! expiry as `exp`. Validation runs with zero leeway and the expiry is
//! checked a second time after signature verification.

use crate::auth::{AuthError, AuthProvider, AuthUser, SUBJECT_KEY, UserAccount, password};
use crate::core::descriptor::EntityDescriptor;
use crate::core::entity::{EntityId, IdValue};
use crate::core::query::QueryDescription;
use crate::core::store::StorageAdapter;
use crate::http::engine::{Handler, HttpEngine, Middleware, Route, handler};
use crate::http::request::Request;
use crate::http::response::Response;
use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGIN_PATH: &str = "/auth/login";

const DEFAULT_TTL_HOURS: i64 = 72;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

#[derive(Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

/// JWT-based [`AuthProvider`], generic over the user model (default
/// [`UserAccount`]).
pub struct JwtAuthProvider<U: AuthUser = UserAccount> {
    inner: Arc<Inner<U>>,
}

#[derive(Clone)]
struct Inner<U: AuthUser> {
    secret: String,
    ttl: Duration,
    store: Arc<dyn StorageAdapter>,
    shape: Arc<EntityDescriptor>,
    _user: PhantomData<fn() -> U>,
}

impl<U: AuthUser> Clone for JwtAuthProvider<U> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<U: AuthUser> JwtAuthProvider<U> {
    /// Token lifetime defaults to 72 hours; override with
    /// [`with_token_ttl`](Self::with_token_ttl).
    pub fn new(secret: impl Into<String>, store: Arc<dyn StorageAdapter>) -> Self {
        Self {
            inner: Arc::new(Inner {
                secret: secret.into(),
                ttl: Duration::hours(DEFAULT_TTL_HOURS),
                store,
                shape: EntityDescriptor::describe::<U>(),
                _user: PhantomData,
            }),
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        Arc::make_mut(&mut self.inner).ttl = ttl;
        self
    }

    /// Sign a token for the given subject, expiring `ttl` from now.
    pub fn issue_token(&self, subject: &str) -> Result<String, AuthError> {
        self.inner.issue_token(subject)
    }

    /// Verify signature and expiry, returning the subject.
    pub fn validate_token(&self, token: &str) -> Result<String, AuthError> {
        self.inner.validate_token(token).map(|claims| claims.sub)
    }
}

impl<U: AuthUser> Inner<U> {
    fn issue_token(&self, subject: &str) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|_| AuthError::Signing)
    }

    fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| AuthError::InvalidToken)?;
        // Expiry is re-checked after signature verification.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims)
    }

    async fn handle_register(&self, req: Request) -> Response {
        let mut user: U = match req.json() {
            Ok(user) => user,
            Err(err) => {
                return Response::error(StatusCode::BAD_REQUEST, format!("invalid input: {}", err));
            }
        };

        let digest = match password::hash_password(user.password()) {
            Ok(digest) => digest,
            Err(err) => {
                return Response::error(StatusCode::BAD_REQUEST, err.to_string());
            }
        };
        user.set_password(digest);

        // Text identities left empty by the caller get a fresh UUID.
        if let IdValue::Text(current) = user.id().to_value()
            && current.is_empty()
            && let Ok(id) = U::Id::from_text(&Uuid::new_v4().to_string())
        {
            user.set_id(id);
        }

        let record = match serde_json::to_value(&user) {
            Ok(record) => record,
            Err(err) => {
                return Response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("failed to encode user: {}", err),
                );
            }
        };
        if let Err(err) = self.store.create(&self.shape, record).await {
            return Response::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to create user: {}", err),
            );
        }

        Response::json(
            StatusCode::CREATED,
            &json!({"message": "user registered successfully"}),
        )
    }

    /// Unknown email and wrong password answer with the same message, so
    /// the endpoint does not reveal which emails exist.
    async fn handle_login(&self, req: Request) -> Response {
        let payload: LoginPayload = match req.json() {
            Ok(payload) => payload,
            Err(err) => {
                return Response::error(StatusCode::BAD_REQUEST, format!("invalid input: {}", err));
            }
        };

        let query = QueryDescription::single_match("email", &payload.email);
        let records = match self.store.find_all(&self.shape, &query).await {
            Ok(records) => records,
            Err(err) => {
                return Response::error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
            }
        };

        let Some(record) = records.into_iter().next() else {
            return Response::error(StatusCode::UNAUTHORIZED, "invalid username or password");
        };
        let user: U = match serde_json::from_value(record) {
            Ok(user) => user,
            Err(err) => {
                return Response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("stored user does not match model: {}", err),
                );
            }
        };

        if !password::verify_password(&payload.password, user.password()) {
            return Response::error(StatusCode::UNAUTHORIZED, "invalid username or password");
        }

        match self.issue_token(&user.id().to_value().canonical()) {
            Ok(token) => Response::json(StatusCode::OK, &json!({"token": token})),
            Err(err) => Response::error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        }
    }
}

fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingBearer)
}

#[async_trait]
impl<U: AuthUser> AuthProvider for JwtAuthProvider<U> {
    async fn init(&self) -> Result<(), AuthError> {
        if self.inner.secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        self.inner
            .store
            .sync_schema(std::slice::from_ref(&*self.inner.shape))
            .await?;
        Ok(())
    }

    fn register_routes(&self, engine: &mut dyn HttpEngine) {
        let register: Handler = {
            let inner = self.inner.clone();
            handler(move |req| {
                let inner = inner.clone();
                async move { inner.handle_register(req).await }
            })
        };
        engine.register_route(
            Route {
                method: Method::POST,
                path: REGISTER_PATH.to_string(),
                entity: self.inner.shape.collection.clone(),
                protected: false,
            },
            register,
        );

        let login: Handler = {
            let inner = self.inner.clone();
            handler(move |req| {
                let inner = inner.clone();
                async move { inner.handle_login(req).await }
            })
        };
        engine.register_route(
            Route {
                method: Method::POST,
                path: LOGIN_PATH.to_string(),
                entity: self.inner.shape.collection.clone(),
                protected: false,
            },
            login,
        );
    }

    fn middleware(&self) -> Middleware {
        let inner = self.inner.clone();
        Arc::new(move |next: Handler| {
            let inner = inner.clone();
            Arc::new(move |mut req: Request| {
                let inner = inner.clone();
                let next = next.clone();
                Box::pin(async move {
                    let token = match extract_bearer_token(req.header("authorization")) {
                        Ok(token) => token.to_string(),
                        Err(err) => {
                            return Response::error(StatusCode::UNAUTHORIZED, err.to_string());
                        }
                    };
                    match inner.validate_token(&token) {
                        Ok(claims) => {
                            req.set(SUBJECT_KEY, Value::String(claims.sub));
                            next(req).await
                        }
                        Err(err) => Response::error(StatusCode::UNAUTHORIZED, err.to_string()),
                    }
                })
            })
        })
    }
}
