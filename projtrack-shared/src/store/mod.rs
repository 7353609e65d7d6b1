/// Resource storage
///
/// [`ResourceStore`] is the persistence seam between the request layer and
/// the database. Two implementations ship with the crate:
///
/// - [`PgStore`]: PostgreSQL through sqlx, used in production
/// - [`MemoryStore`]: in-process maps, used by tests and local demos
///
/// Both enforce the same uniqueness rules, case-insensitive user email and
/// per-owner project name, and both cascade deletes down the ownership
/// chain. The store is the last line of defence for uniqueness: when two
/// concurrent creates pass validation with the same name, the second write
/// fails with [`StoreError::DuplicateName`].
///
/// The store performs no authorization. Callers run the gate first.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::project::{is_owner_name_violation, CreateProject, Project, UpdateProject};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, User, USER_EMAIL_CONSTRAINT};
use crate::validation::ExistingScope;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The owner already has a project with this name
    #[error("Project name has already been taken for this owner")]
    DuplicateName,

    /// Another account already uses this email
    #[error("Email has already been taken")]
    DuplicateEmail,

    /// Any other storage failure
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_owner_name_violation(&err) {
            return StoreError::DuplicateName;
        }
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.constraint() == Some(USER_EMAIL_CONSTRAINT) {
                return StoreError::DuplicateEmail;
            }
        }
        StoreError::Database(err.to_string())
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for users, projects and tasks
///
/// Tasks are always addressed by `(project_id, id)`.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Checks the backing store is reachable
    async fn ping(&self) -> StoreResult<()>;

    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Case-insensitive lookup
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Deletes the user with all owned projects and their tasks
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Projects owned by `owner_id` only
    async fn list_projects(&self, owner_id: Uuid) -> StoreResult<Vec<Project>>;

    async fn count_projects(&self, owner_id: Uuid) -> StoreResult<i64>;

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project>;

    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>>;

    /// Deletes the project with all its tasks
    async fn delete_project(&self, id: Uuid) -> StoreResult<bool>;

    async fn find_task(&self, project_id: Uuid, id: Uuid) -> StoreResult<Option<Task>>;

    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>>;

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn update_task(
        &self,
        project_id: Uuid,
        id: Uuid,
        data: UpdateTask,
    ) -> StoreResult<Option<Task>>;

    async fn delete_task(&self, project_id: Uuid, id: Uuid) -> StoreResult<bool>;

    /// Read view of `owner_id`'s projects for the uniqueness check
    async fn project_scope(&self, owner_id: Uuid) -> StoreResult<ExistingScope> {
        let projects = self.list_projects(owner_id).await?;

        Ok(ExistingScope::new(
            owner_id,
            projects.into_iter().map(|p| (p.id, p.name)).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        assert!(StoreError::DuplicateName.to_string().contains("already been taken"));
        assert!(StoreError::DuplicateEmail.to_string().contains("Email"));
        assert!(StoreError::Database("boom".to_string()).to_string().contains("boom"));
    }

    #[test]
    fn test_non_constraint_sqlx_errors_map_to_database() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }
}
