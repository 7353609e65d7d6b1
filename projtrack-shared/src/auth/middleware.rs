/// Actor resolution middleware for Axum
///
/// Reads the `Authorization: Bearer <token>` header, validates the access
/// token, confirms the user still exists in the store and records the
/// outcome in the request extensions as a [`CurrentActor`]. Unlike a hard authentication layer it never rejects a
/// request: a missing, malformed, expired or forged token, or one whose
/// account has been cancelled, simply resolves to "no actor", and the authorization gate turns that into a sign-in
/// redirect for the routes that need one. Public routes (home, sign-in) run
/// behind the same layer unaffected.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use projtrack_shared::auth::middleware::{create_actor_middleware, CurrentActor};
/// use projtrack_shared::store::{MemoryStore, ResourceStore};
/// use std::sync::Arc;
///
/// async fn handler(CurrentActor(actor): CurrentActor) -> String {
///     match actor {
///         Some(actor) => format!("Hello, {}", actor.user_id),
///         None => "Hello, guest".to_string(),
///     }
/// }
///
/// let store: Arc<dyn ResourceStore> = Arc::new(MemoryStore::new());
/// let app: Router = Router::new()
///     .route("/", get(handler))
///     .layer(middleware::from_fn(create_actor_middleware("secret", store)));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;

use super::authorization::Actor;
use super::jwt::validate_access_token;
use crate::store::ResourceStore;

/// The actor resolved for the current request, `None` when unauthenticated
///
/// Extract it directly in handlers; if the middleware did not run the
/// extractor yields `CurrentActor(None)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentActor(pub Option<Actor>);

impl CurrentActor {
    pub fn actor(&self) -> Option<&Actor> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentActor>()
            .copied()
            .unwrap_or_default())
    }
}

/// Resolves the actor from request headers
///
/// Returns `None` for anything other than a valid access token.
pub fn resolve_actor(headers: &HeaderMap, secret: &str) -> Option<Actor> {
    let auth_header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        tracing::debug!("Authorization header is not a Bearer token");
        return None;
    };

    match validate_access_token(token.trim(), secret) {
        Ok(claims) => Some(Actor::new(claims.sub)),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid access token");
            None
        }
    }
}

/// Resolves the actor and checks that the account behind it still exists
///
/// A valid token for a deleted user resolves to `None`, as does a store
/// failure during the lookup.
pub async fn resolve_known_actor(
    headers: &HeaderMap,
    secret: &str,
    store: &dyn ResourceStore,
) -> Option<Actor> {
    let actor = resolve_actor(headers, secret)?;

    match store.find_user(actor.user_id).await {
        Ok(Some(_)) => Some(actor),
        Ok(None) => {
            tracing::debug!(user_id = %actor.user_id, "Token names a user that no longer exists");
            None
        }
        Err(e) => {
            tracing::warn!(user_id = %actor.user_id, error = %e, "Actor lookup failed");
            None
        }
    }
}

/// Actor resolution middleware
///
/// Always forwards the request, with a [`CurrentActor`] extension attached.
pub async fn actor_middleware(
    secret: String,
    store: Arc<dyn ResourceStore>,
    mut req: Request,
    next: Next,
) -> Response {
    let actor = resolve_known_actor(req.headers(), &secret, store.as_ref()).await;
    req.extensions_mut().insert(CurrentActor(actor));

    next.run(req).await
}

/// Creates an actor middleware closure capturing the JWT secret and store
///
/// Use with `axum::middleware::from_fn`.
pub fn create_actor_middleware(
    secret: impl Into<String>,
    store: Arc<dyn ResourceStore>,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>> + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        let store = store.clone();
        Box::pin(actor_middleware(secret, store, req, next))
    }
}
