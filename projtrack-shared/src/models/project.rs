/// Project model and database operations
///
/// A project belongs to exactly one user (its owner) and owns any number of
/// tasks. Within one owner, project names are unique; two different owners
/// may each have a project with the same name.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL CHECK (btrim(name) <> ''),
///     description TEXT,
///     due_on DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT projects_owner_id_name_key UNIQUE (owner_id, name)
/// );
/// ```
///
/// The unique constraint is the final arbiter for concurrent creates: the
/// validation pre-check can race, the constraint cannot.
///
/// # Example
///
/// ```no_run
/// use projtrack_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     owner_id,
///     name: "Test Project".to_string(),
///     description: Some("Trying things out".to_string()),
///     due_on: None,
/// }).await?;
///
/// assert_eq!(Project::count_by_owner(&pool, owner_id).await?, 1);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::Owned;
use crate::status;

/// Name of the unique constraint on `(owner_id, name)`
pub const PROJECT_OWNER_NAME_CONSTRAINT: &str = "projects_owner_id_name_key";

/// Project model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// User who exclusively owns this project
    pub owner_id: Uuid,

    /// Project name, unique per owner
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Optional due date (calendar date, no time component)
    pub due_on: Option<NaiveDate>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Whether the project is late as of the given date
    ///
    /// Derived, never stored. See [`status::is_late`].
    pub fn is_late(&self, as_of: NaiveDate) -> bool {
        status::is_late(self.due_on, as_of)
    }
}

impl Owned for Project {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Input for creating a new project
///
/// `owner_id` is always the acting user; there is no cross-user create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub owner_id: Uuid,

    pub name: String,

    pub description: Option<String>,

    pub due_on: Option<NaiveDate>,
}

/// Input for updating a project
///
/// Only `Some` fields are written. Optional columns use a double `Option` so
/// that `Some(None)` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,

    pub description: Option<Option<String>>,

    pub due_on: Option<Option<NaiveDate>>,
}

impl UpdateProject {
    /// Applies the update to an in-memory project
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(ref name) = self.name {
            project.name = name.clone();
        }
        if let Some(ref description) = self.description {
            project.description = description.clone();
        }
        if let Some(due_on) = self.due_on {
            project.due_on = due_on;
        }
    }
}

/// Returns true if `err` is a violation of the per-owner name constraint
pub fn is_owner_name_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.constraint() == Some(PROJECT_OWNER_NAME_CONSTRAINT)
        }
        _ => false,
    }
}

const PROJECT_COLUMNS: &str = "id, owner_id, name, description, due_on, created_at, updated_at";

impl Project {
    /// Creates a new project
    ///
    /// # Errors
    ///
    /// Returns a database error carrying `projects_owner_id_name_key` when the
    /// owner already has a project with this name.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (owner_id, name, description, due_on) \
             VALUES ($1, $2, $3, $4) RETURNING {PROJECT_COLUMNS}"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(data.owner_id)
            .bind(data.name)
            .bind(data.description)
            .bind(data.due_on)
            .fetch_one(pool)
            .await
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists the projects owned by `owner_id`, oldest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE owner_id = $1 ORDER BY created_at, name"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Counts the projects owned by `owner_id`
    pub async fn count_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Updates an existing project
    ///
    /// Only non-None fields in `data` are written. `updated_at` is always
    /// refreshed.
    ///
    /// # Returns
    ///
    /// The updated project, or None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.due_on.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_on = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {PROJECT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_on) = data.due_on {
            q = q.bind(due_on);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a project and, by cascade, its tasks
    ///
    /// # Returns
    ///
    /// True if the project was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
