/// Project endpoints
///
/// Every route is owner-only. Guests are redirected to the sign-in page and
/// signed-in users who do not own the project (or name one that does not
/// exist) are redirected to the dashboard.
///
/// - `GET /projects` - The actor's projects
/// - `POST /projects` - Create a project owned by the actor
/// - `GET /projects/:project_id` - One project with its tasks
/// - `PATCH|PUT /projects/:project_id` - Update name, description, due date
/// - `DELETE /projects/:project_id` - Delete the project and its tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{authorize_actor, double_option, find_project, parse_body, ResourceIds},
};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use projtrack_shared::{
    auth::{
        authorization::{Operation, Target},
        middleware::CurrentActor,
    },
    models::{
        project::{CreateProject, Project, UpdateProject},
        task::Task,
    },
    validation::{validate, Payload, ProjectPayload},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

/// Create request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(max = 255, message = "is too long (maximum is 255 characters)"))]
    pub name: Option<String>,

    pub description: Option<String>,

    pub due_on: Option<NaiveDate>,
}

/// Update request
///
/// Absent fields are left alone; `null` clears `description` or `due_on`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(max = 255, message = "is too long (maximum is 255 characters)"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_on: Option<Option<NaiveDate>>,
}

/// A project as rendered to its owner
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Project,

    /// Due date strictly before today
    pub late: bool,

    pub owner_name: String,
}

impl ProjectResponse {
    pub fn new(project: Project, today: NaiveDate, owner_name: String) -> Self {
        Self {
            late: project.is_late(today),
            project,
            owner_name,
        }
    }
}

/// Response to create and update
#[derive(Debug, Serialize)]
pub struct ProjectEnvelope {
    pub notice: String,
    pub project: ProjectResponse,
}

/// Response to show
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub project: ProjectResponse,
    pub tasks: Vec<Task>,
}

async fn owner_name(state: &AppState, owner_id: Uuid) -> ApiResult<String> {
    Ok(state
        .store
        .find_user(owner_id)
        .await?
        .map(|user| user.name())
        .unwrap_or_default())
}

/// Renders projects that all belong to `owner_id`
pub(crate) async fn render_projects(
    state: &AppState,
    owner_id: Uuid,
    projects: Vec<Project>,
) -> ApiResult<Vec<ProjectResponse>> {
    let name = owner_name(state, owner_id).await?;
    let today = state.today();

    Ok(projects
        .into_iter()
        .map(|project| ProjectResponse::new(project, today, name.clone()))
        .collect())
}

async fn render_project(state: &AppState, project: Project) -> ApiResult<ProjectResponse> {
    let name = owner_name(state, project.owner_id).await?;
    Ok(ProjectResponse::new(project, state.today(), name))
}

/// List the actor's projects
pub async fn list_projects(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Value>> {
    let actor = authorize_actor(actor, Target::OwnScope, Operation::List)?;

    let projects = state.store.list_projects(actor.user_id).await?;
    let projects = render_projects(&state, actor.user_id, projects).await?;

    Ok(Json(json!({ "projects": projects })))
}

/// Create a project owned by the actor
///
/// ```text
/// POST /projects
/// Content-Type: application/json
///
/// { "name": "Test Project", "description": "Trying things out", "due_on": "2016-10-01" }
/// ```
///
/// # Errors
///
/// - `302 Found` to `/users/sign_in` for guests
/// - `422 Unprocessable Entity`: blank name, name already used by this owner,
///   or name longer than 255 characters
pub async fn create_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ProjectEnvelope>)> {
    let actor = authorize_actor(actor, Target::OwnScope, Operation::Create)?;
    let req: CreateProjectRequest = parse_body(&body)?;

    let scope = state.store.project_scope(actor.user_id).await?;
    let payload = Payload::Project(ProjectPayload::create(actor.user_id, req.name.as_deref()));
    validate(&payload, &scope).into_result()?;
    req.validate()?;

    let project = state
        .store
        .create_project(CreateProject {
            owner_id: actor.user_id,
            name: req.name.unwrap_or_default(),
            description: req.description,
            due_on: req.due_on,
        })
        .await?;

    tracing::info!(project_id = %project.id, owner_id = %actor.user_id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(ProjectEnvelope {
            notice: "Project was successfully created.".to_string(),
            project: render_project(&state, project).await?,
        }),
    ))
}

/// Show one project with its tasks
pub async fn show_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ids: ResourceIds,
) -> ApiResult<Json<ProjectDetail>> {
    let project = find_project(&state, ids.project_id).await?;
    authorize_actor(actor, Target::project(project.as_ref()), Operation::Read)?;
    let project = project.ok_or(ApiError::RedirectHome)?;

    let tasks = state.store.list_tasks(project.id).await?;

    Ok(Json(ProjectDetail {
        project: render_project(&state, project).await?,
        tasks,
    }))
}

/// Update a project
///
/// A rename is checked against the owner's other projects; keeping the
/// current name is always accepted.
pub async fn update_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ids: ResourceIds,
    body: Bytes,
) -> ApiResult<Json<ProjectEnvelope>> {
    let project = find_project(&state, ids.project_id).await?;
    let actor = authorize_actor(actor, Target::project(project.as_ref()), Operation::Update)?;
    let project = project.ok_or(ApiError::RedirectHome)?;
    let req: UpdateProjectRequest = parse_body(&body)?;

    let name = req.name.as_deref().unwrap_or(&project.name);
    let scope = state.store.project_scope(actor.user_id).await?;
    let payload = Payload::Project(ProjectPayload::update(project.id, actor.user_id, Some(name)));
    validate(&payload, &scope).into_result()?;
    req.validate()?;

    let updated = state
        .store
        .update_project(
            project.id,
            UpdateProject {
                name: req.name,
                description: req.description,
                due_on: req.due_on,
            },
        )
        .await?
        .ok_or(ApiError::RedirectHome)?;

    tracing::info!(project_id = %updated.id, "Project updated");

    Ok(Json(ProjectEnvelope {
        notice: "Project was successfully updated.".to_string(),
        project: render_project(&state, updated).await?,
    }))
}

/// Delete a project and all its tasks
pub async fn delete_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ids: ResourceIds,
) -> ApiResult<Json<Value>> {
    let project = find_project(&state, ids.project_id).await?;
    authorize_actor(actor, Target::project(project.as_ref()), Operation::Delete)?;
    let project = project.ok_or(ApiError::RedirectHome)?;

    if !state.store.delete_project(project.id).await? {
        return Err(ApiError::RedirectHome);
    }

    tracing::info!(project_id = %project.id, "Project deleted");

    Ok(Json(json!({ "notice": "Project was successfully destroyed." })))
}
