/// In-memory resource store
///
/// Holds users, projects and tasks in maps behind a single
/// [`tokio::sync::RwLock`]. Every write takes the lock for its whole
/// check-then-insert, so the per-owner name rule holds under concurrent
/// creates exactly as the PostgreSQL constraint does.
///
/// Used by the API integration tests and by `STORE_BACKEND=memory`.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ResourceStore, StoreError, StoreResult};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
}

impl Tables {
    fn email_taken(&self, email: &str) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email))
    }

    fn name_taken(&self, owner_id: Uuid, name: &str, exclude: Option<Uuid>) -> bool {
        self.projects.values().any(|p| {
            p.owner_id == owner_id && p.name == name && Some(p.id) != exclude
        })
    }

    fn remove_project_cascade(&mut self, project_id: Uuid) -> bool {
        let removed = self.projects.remove(&project_id).is_some();
        if removed {
            self.tasks.retain(|_, t| t.project_id != project_id);
        }
        removed
    }
}

/// Process-local store, cleared when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_creation<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> (chrono::DateTime<Utc>, String),
{
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.email_taken(&data.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;

        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }

        let owned: Vec<Uuid> = tables
            .projects
            .values()
            .filter(|p| p.owner_id == id)
            .map(|p| p.id)
            .collect();
        for project_id in owned {
            tables.remove_project_cascade(project_id);
        }

        Ok(true)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn list_projects(&self, owner_id: Uuid) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        let projects = tables
            .projects
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();

        Ok(sorted_by_creation(projects, |p: &Project| {
            (p.created_at, p.name.clone())
        }))
    }

    async fn count_projects(&self, owner_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .projects
            .values()
            .filter(|p| p.owner_id == owner_id)
            .count();

        Ok(count as i64)
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&data.owner_id) {
            return Err(StoreError::Database(format!(
                "owner {} does not exist",
                data.owner_id
            )));
        }
        if tables.name_taken(data.owner_id, &data.name, None) {
            return Err(StoreError::DuplicateName);
        }

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            name: data.name,
            description: data.description,
            due_on: data.due_on,
            created_at: now,
            updated_at: now,
        };
        tables.projects.insert(project.id, project.clone());

        Ok(project)
    }

    async fn update_project(&self, id: Uuid, data: UpdateProject) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;

        let Some(mut project) = tables.projects.get(&id).cloned() else {
            return Ok(None);
        };

        data.apply_to(&mut project);
        if tables.name_taken(project.owner_id, &project.name, Some(id)) {
            return Err(StoreError::DuplicateName);
        }

        project.updated_at = Utc::now();
        tables.projects.insert(id, project.clone());

        Ok(Some(project))
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.remove_project_cascade(id))
    }

    async fn find_task(&self, project_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;

        Ok(tables
            .tasks
            .get(&id)
            .filter(|t| t.project_id == project_id)
            .cloned())
    }

    async fn list_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let tasks = tables
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();

        Ok(sorted_by_creation(tasks, |t: &Task| (t.created_at, t.name.clone())))
    }

    async fn create_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        if !tables.projects.contains_key(&data.project_id) {
            return Err(StoreError::Database(format!(
                "project {} does not exist",
                data.project_id
            )));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            name: data.name,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn update_task(
        &self,
        project_id: Uuid,
        id: Uuid,
        data: UpdateTask,
    ) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;

        let Some(task) = tables
            .tasks
            .get_mut(&id)
            .filter(|t| t.project_id == project_id)
        else {
            return Ok(None);
        };

        data.apply_to(task);
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, project_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let belongs = tables
            .tasks
            .get(&id)
            .is_some_and(|t| t.project_id == project_id);
        if belongs {
            tables.tasks.remove(&id);
        }

        Ok(belongs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn new_project(owner_id: Uuid, name: &str) -> CreateProject {
        CreateProject {
            owner_id,
            name: name.to_string(),
            description: None,
            due_on: None,
        }
    }

    #[tokio::test]
    async fn test_email_is_unique_ignoring_case() {
        let store = MemoryStore::new();
        store.create_user(new_user("owner@example.com")).await.unwrap();

        let dup = store.create_user(new_user("Owner@Example.com")).await;
        assert!(matches!(dup, Err(StoreError::DuplicateEmail)));

        let found = store.find_user_by_email("OWNER@example.com").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_project_names_unique_per_owner() {
        let store = MemoryStore::new();
        let alice = store.create_user(new_user("alice@example.com")).await.unwrap();
        let bob = store.create_user(new_user("bob@example.com")).await.unwrap();

        store.create_project(new_project(alice.id, "Test Project")).await.unwrap();

        let dup = store.create_project(new_project(alice.id, "Test Project")).await;
        assert!(matches!(dup, Err(StoreError::DuplicateName)));

        // Different owner, same name
        store.create_project(new_project(bob.id, "Test Project")).await.unwrap();

        assert_eq!(store.count_projects(alice.id).await.unwrap(), 1);
        assert_eq!(store.count_projects(bob.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_own_name_but_rejects_sibling() {
        let store = MemoryStore::new();
        let owner = store.create_user(new_user("owner@example.com")).await.unwrap();
        let first = store.create_project(new_project(owner.id, "First")).await.unwrap();
        store.create_project(new_project(owner.id, "Second")).await.unwrap();

        let same = UpdateProject {
            name: Some("First".to_string()),
            description: Some(Some("updated".to_string())),
            ..Default::default()
        };
        let updated = store.update_project(first.id, same).await.unwrap().unwrap();
        assert_eq!(updated.description.as_deref(), Some("updated"));

        let clash = UpdateProject {
            name: Some("Second".to_string()),
            ..Default::default()
        };
        let err = store.update_project(first.id, clash).await;
        assert!(matches!(err, Err(StoreError::DuplicateName)));

        let unchanged = store.find_project(first.id).await.unwrap().unwrap();
        assert_eq!(unchanged.name, "First");
    }

    #[tokio::test]
    async fn test_concurrent_creates_admit_one() {
        let store = Arc::new(MemoryStore::new());
        let owner_id = store.create_user(new_user("owner@example.com")).await.unwrap().id;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create_project(new_project(owner_id, "Race")).await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }

        assert_eq!(ok, 1);
        assert_eq!(store.count_projects(owner_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_tasks_are_scoped_to_project() {
        let store = MemoryStore::new();
        let owner = store.create_user(new_user("owner@example.com")).await.unwrap();
        let a = store.create_project(new_project(owner.id, "A")).await.unwrap();
        let b = store.create_project(new_project(owner.id, "B")).await.unwrap();

        let task = store
            .create_task(CreateTask { project_id: a.id, name: "Write".to_string() })
            .await
            .unwrap();

        assert!(store.find_task(a.id, task.id).await.unwrap().is_some());
        assert!(store.find_task(b.id, task.id).await.unwrap().is_none());
        assert!(!store.delete_task(b.id, task.id).await.unwrap());

        let renamed = store
            .update_task(a.id, task.id, UpdateTask { name: Some("Review".to_string()) })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Review");
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = MemoryStore::new();
        let owner = store.create_user(new_user("owner@example.com")).await.unwrap();
        let project = store.create_project(new_project(owner.id, "Doomed")).await.unwrap();
        let task = store
            .create_task(CreateTask { project_id: project.id, name: "Task".to_string() })
            .await
            .unwrap();

        assert!(store.delete_user(owner.id).await.unwrap());

        assert!(store.find_project(project.id).await.unwrap().is_none());
        assert!(store.find_task(project.id, task.id).await.unwrap().is_none());
        assert!(!store.delete_user(owner.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_project_scope_lists_owner_names() {
        let store = MemoryStore::new();
        let owner = store.create_user(new_user("owner@example.com")).await.unwrap();
        store.create_project(new_project(owner.id, "Alpha")).await.unwrap();

        let scope = store.project_scope(owner.id).await.unwrap();
        assert_eq!(scope.owner_id(), Some(owner.id));
        assert_eq!(scope.entries().len(), 1);
        assert_eq!(scope.entries()[0].name, "Alpha");
    }

    #[tokio::test]
    async fn test_missing_parents_are_rejected() {
        let store = MemoryStore::new();

        let project = store.create_project(new_project(Uuid::new_v4(), "Orphan")).await;
        assert!(matches!(project, Err(StoreError::Database(_))));

        let task = store
            .create_task(CreateTask { project_id: Uuid::new_v4(), name: "Orphan".to_string() })
            .await;
        assert!(matches!(task, Err(StoreError::Database(_))));
    }
}
