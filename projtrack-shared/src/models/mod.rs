/// Database models for projtrack
///
/// # Models
///
/// - `user`: User accounts (top of the ownership chain)
/// - `project`: Projects, exclusively owned by one user
/// - `task`: Tasks, exclusively owned by one project
///
/// Ownership is modelled as explicit foreign keys plus owner resolution
/// functions. A project reports its owner through [`Owned`]; a task resolves
/// its owner through its project with [`task::task_owner`].

use uuid::Uuid;

pub mod project;
pub mod task;
pub mod user;

/// A resource with a directly stored owner
pub trait Owned {
    /// ID of the user who exclusively controls this resource
    fn owner_id(&self) -> Uuid;
}
