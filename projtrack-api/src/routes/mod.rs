/// API route handlers
///
/// - `home`: dashboard (public)
/// - `health`: health check (public)
/// - `users`: sign-up, sign-in, token refresh, account cancellation
/// - `projects`: project CRUD, owner only
/// - `tasks`: task CRUD nested under a project, owner only
///
/// Resource handlers follow one order: resolve the actor, load the target,
/// ask the ownership gate, then (for writes) parse and validate the body,
/// and only then touch the store. A denied request never reads its body.

pub mod health;
pub mod home;
pub mod projects;
pub mod tasks;
pub mod users;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use projtrack_shared::{
    auth::authorization::{require, Actor, Operation, Target},
    models::project::Project,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use std::{collections::HashMap, convert::Infallible};
use uuid::Uuid;

/// Resource ids captured from the URL
///
/// Never rejects. An id that is absent or not a UUID is `None` and resolves
/// to no resource, so the gate still decides the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceIds {
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
}

impl ResourceIds {
    fn from_params(params: &HashMap<String, String>) -> Self {
        let id = |key: &str| params.get(key).and_then(|raw| Uuid::parse_str(raw).ok());

        Self {
            project_id: id("project_id"),
            task_id: id("task_id"),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ResourceIds
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map(|Path(params)| params)
            .unwrap_or_default();

        Ok(Self::from_params(&params))
    }
}

/// Loads the project an id names, if any
pub(crate) async fn find_project(
    state: &AppState,
    project_id: Option<Uuid>,
) -> ApiResult<Option<Project>> {
    match project_id {
        Some(id) => Ok(state.store.find_project(id).await?),
        None => Ok(None),
    }
}

/// Runs the ownership gate and returns the actor it admitted
pub(crate) fn authorize_actor(
    actor: Option<Actor>,
    target: Target,
    operation: Operation,
) -> ApiResult<Actor> {
    require(actor.as_ref(), target, operation)?;
    actor.ok_or(ApiError::SignInRequired)
}

/// Parses a JSON request body; an empty body is the type's default
pub(crate) fn parse_body<T>(body: &Bytes) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
