/// Task model and database operations
///
/// Tasks hang off a single project and carry no owner of their own; the
/// governing owner is the owner of the parent project. Tasks are always
/// addressed by the `(project_id, id)` pair.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL CHECK (btrim(name) <> ''),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::project::Project;

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Project this task belongs to
    pub project_id: Uuid,

    /// Task name (required, not unique)
    pub name: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Resolves the effective owner of a task through its project
///
/// Returns `None` when `task` does not belong to `project`, so a mismatched
/// pair can never borrow another project's owner.
pub fn task_owner(task: &Task, project: &Project) -> Option<Uuid> {
    (task.project_id == project.id).then_some(project.owner_id)
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: Uuid,

    pub name: String,
}

/// Input for updating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub name: Option<String>,
}

impl UpdateTask {
    /// Applies the update to an in-memory task
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(ref name) = self.name {
            task.name = name.clone();
        }
    }
}

impl Task {
    /// Creates a new task under a project
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, name)
            VALUES ($1, $2)
            RETURNING id, project_id, name, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.name)
        .fetch_one(pool)
        .await
    }

    /// Finds a task by its `(project_id, id)` address
    pub async fn find_by_project_and_id(
        pool: &PgPool,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, name, created_at, updated_at
            FROM tasks
            WHERE project_id = $1 AND id = $2
            "#,
        )
        .bind(project_id)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists every task of a project, oldest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, name, created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Updates a task addressed by `(project_id, id)`
    pub async fn update(
        pool: &PgPool,
        project_id: Uuid,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET name = COALESCE($3, name), updated_at = NOW()
            WHERE project_id = $1 AND id = $2
            RETURNING id, project_id, name, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(id)
        .bind(data.name)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a task addressed by `(project_id, id)`
    pub async fn delete(pool: &PgPool, project_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE project_id = $1 AND id = $2")
            .bind(project_id)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
