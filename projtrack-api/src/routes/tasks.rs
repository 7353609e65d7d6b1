/// Task endpoints, nested under a project
///
/// A task inherits its owner from its project, so every route loads the
/// project first and asks the gate about it. A task id that belongs to a
/// different project is treated as missing.
///
/// All responses are `application/json`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{authorize_actor, find_project, parse_body, ResourceIds},
};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Json,
};
use projtrack_shared::{
    auth::{
        authorization::{Operation, Target},
        middleware::CurrentActor,
    },
    models::{
        project::Project,
        task::{CreateTask, Task, UpdateTask},
    },
    validation::{validate, ExistingScope, Payload, TaskPayload},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

/// Create or update request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskRequest {
    #[validate(length(max = 255, message = "is too long (maximum is 255 characters)"))]
    pub name: Option<String>,
}

/// Response to create and update
#[derive(Debug, Serialize)]
pub struct TaskEnvelope {
    pub notice: String,
    pub task: Task,
}

/// Loads a project and, when it exists, one of its tasks
async fn load_task(state: &AppState, ids: ResourceIds) -> ApiResult<(Option<Project>, Option<Task>)> {
    let Some(project) = find_project(state, ids.project_id).await? else {
        return Ok((None, None));
    };
    let task = match ids.task_id {
        Some(task_id) => state.store.find_task(project.id, task_id).await?,
        None => None,
    };

    Ok((Some(project), task))
}

fn validate_task_name(name: Option<&str>) -> ApiResult<()> {
    let payload = Payload::Task(TaskPayload::new(name));
    Ok(validate(&payload, &ExistingScope::empty()).into_result()?)
}

/// List a project's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ids: ResourceIds,
) -> ApiResult<Json<Value>> {
    let project = find_project(&state, ids.project_id).await?;
    authorize_actor(actor, Target::project(project.as_ref()), Operation::List)?;
    let project = project.ok_or(ApiError::RedirectHome)?;

    let tasks = state.store.list_tasks(project.id).await?;

    Ok(Json(json!({ "project_id": project.id, "tasks": tasks })))
}

/// Add a task to a project
///
/// ```text
/// POST /projects/:project_id/tasks
/// Content-Type: application/json
///
/// { "name": "Write the report" }
/// ```
pub async fn create_task(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ids: ResourceIds,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<TaskEnvelope>)> {
    let project = find_project(&state, ids.project_id).await?;
    authorize_actor(actor, Target::project(project.as_ref()), Operation::Create)?;
    let project = project.ok_or(ApiError::RedirectHome)?;
    let req: TaskRequest = parse_body(&body)?;

    validate_task_name(req.name.as_deref())?;
    req.validate()?;

    let task = state
        .store
        .create_task(CreateTask {
            project_id: project.id,
            name: req.name.unwrap_or_default(),
        })
        .await?;

    tracing::info!(task_id = %task.id, project_id = %project.id, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(TaskEnvelope {
            notice: "Task was successfully created.".to_string(),
            task,
        }),
    ))
}

/// Show one task
pub async fn show_task(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ids: ResourceIds,
) -> ApiResult<Json<Task>> {
    let (project, task) = load_task(&state, ids).await?;
    authorize_actor(actor, Target::task(task.as_ref(), project.as_ref()), Operation::Read)?;

    Ok(Json(task.ok_or(ApiError::RedirectHome)?))
}

/// Rename a task
pub async fn update_task(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ids: ResourceIds,
    body: Bytes,
) -> ApiResult<Json<TaskEnvelope>> {
    let (project, task) = load_task(&state, ids).await?;
    authorize_actor(actor, Target::task(task.as_ref(), project.as_ref()), Operation::Update)?;
    let task = task.ok_or(ApiError::RedirectHome)?;
    let req: TaskRequest = parse_body(&body)?;

    validate_task_name(Some(req.name.as_deref().unwrap_or(&task.name)))?;
    req.validate()?;

    let updated = state
        .store
        .update_task(task.project_id, task.id, UpdateTask { name: req.name })
        .await?
        .ok_or(ApiError::RedirectHome)?;

    Ok(Json(TaskEnvelope {
        notice: "Task was successfully updated.".to_string(),
        task: updated,
    }))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ids: ResourceIds,
) -> ApiResult<Json<Value>> {
    let (project, task) = load_task(&state, ids).await?;
    authorize_actor(actor, Target::task(task.as_ref(), project.as_ref()), Operation::Delete)?;
    let task = task.ok_or(ApiError::RedirectHome)?;

    if !state.store.delete_task(task.project_id, task.id).await? {
        return Err(ApiError::RedirectHome);
    }

    Ok(Json(json!({ "notice": "Task was successfully destroyed." })))
}
