/// Dashboard
///
/// `GET /` is public and always answers `200`; it is where users who are
/// denied access to a project land. A signed-in visitor also sees their
/// own projects with the late flag.

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{projects::render_projects, users::UserSummary},
};
use axum::{extract::State, Json};
use projtrack_shared::auth::middleware::CurrentActor;
use serde_json::{json, Value};

pub async fn dashboard(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Value>> {
    let user = match actor {
        Some(actor) => state.store.find_user(actor.user_id).await?,
        None => None,
    };

    let Some(user) = user else {
        return Ok(Json(json!({
            "signed_in": false,
            "sign_in_path": "/users/sign_in",
        })));
    };

    let projects = state.store.list_projects(user.id).await?;
    let projects = render_projects(&state, user.id, projects).await?;

    Ok(Json(json!({
        "signed_in": true,
        "user": UserSummary::from(&user),
        "today": state.today(),
        "projects": projects,
    })))
}
