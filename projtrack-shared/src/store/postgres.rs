/// PostgreSQL-backed resource store
///
/// Thin adapter from [`ResourceStore`] to the sqlx model functions. Unique
/// and foreign-key constraints live in the schema (see `migrations/`), so
/// uniqueness races and cascades are resolved by PostgreSQL itself.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ResourceStore, StoreResult};
use crate::db::pool::health_check;
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, User};

/// Store over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ResourceStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects(&self, owner_id: Uuid) -> StoreResult<Vec<Project>> {
        Ok(Project::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn count_projects(&self, owner_id: Uuid) -> StoreResult<i64> {
        Ok(Project::count_by_owner(&self.pool, owner_id).await?)
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>> {
        Ok(Project::update(&self.pool, id, data).await?)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Project::delete(&self.pool, id).await?)
    }

    async fn find_task(&self, project_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_project_and_id(&self.pool, project_id, id).await?)
    }

    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, project_id).await?)
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn update_task(
        &self,
        project_id: Uuid,
        id: Uuid,
        data: UpdateTask,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, project_id, id, data).await?)
    }

    async fn delete_task(&self, project_id: Uuid, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, project_id, id).await?)
    }
}
