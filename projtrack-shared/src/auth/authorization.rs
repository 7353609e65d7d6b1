/// Ownership-based authorization gate
///
/// Decides whether an actor may perform an operation on a project or task.
/// The gate is a synchronous predicate over identities the caller has
/// already loaded; it never touches the store and keeps no state between
/// calls.
///
/// # Permission Model
///
/// 1. **No actor**: every operation is denied with
///    [`Decision::DenyUnauthenticated`]. There is no guest view.
/// 2. **Owner**: the actor's id equals the resource's effective owner id
///    (for a task, the owner of its project). Every operation is allowed.
/// 3. **Anyone else**: denied with `DenyRedirect(Root)`.
/// 4. **Missing resource**: an id that did not resolve is denied exactly like
///    case 3, so non-owners cannot probe for existence.
///
/// Create and list are always evaluated against the actor's own scope
/// ([`Target::OwnScope`]); callers set `owner_id = actor.user_id` on create and
/// filter enumerations by the same predicate.
///
/// # Example
///
/// ```
/// use projtrack_shared::auth::authorization::{authorize, Actor, Decision, Operation, RedirectTarget, Target};
/// use uuid::Uuid;
///
/// let owner = Actor::new(Uuid::new_v4());
/// let stranger = Actor::new(Uuid::new_v4());
/// let project = Target::Owned(owner.user_id);
///
/// assert_eq!(authorize(Some(&owner), project, Operation::Update), Decision::Allow);
/// assert_eq!(
///     authorize(Some(&stranger), project, Operation::Update),
///     Decision::DenyRedirect(RedirectTarget::Root)
/// );
/// assert_eq!(authorize(None, project, Operation::Read), Decision::DenyUnauthenticated);
/// ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::project::Project;
use crate::models::task::{task_owner, Task};
use crate::models::Owned;

/// An authenticated user acting on resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
}

impl Actor {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Operation requested on a project or task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the gate is asked about, reduced to its effective owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// An existing resource governed by this owner id
    Owned(Uuid),

    /// The requested id did not resolve to a resource
    Missing,

    /// The actor's own collection (create / list)
    OwnScope,
}

impl Target {
    /// Target for a loaded project, or `Missing` if the lookup found nothing
    pub fn project(project: Option<&Project>) -> Self {
        match project {
            Some(p) => Target::Owned(p.owner_id()),
            None => Target::Missing,
        }
    }

    /// Target for a task reached through its project
    ///
    /// Missing if either lookup failed or the task is not in that project.
    pub fn task(task: Option<&Task>, project: Option<&Project>) -> Self {
        match (task, project) {
            (Some(t), Some(p)) => task_owner(t, p).map_or(Target::Missing, Target::Owned),
            _ => Target::Missing,
        }
    }
}

/// Where a denied actor is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectTarget {
    /// Home / dashboard
    Root,

    /// Sign-in page
    SignIn,
}

impl RedirectTarget {
    /// Canonical path of the destination
    pub fn path(&self) -> &'static str {
        match self {
            RedirectTarget::Root => "/",
            RedirectTarget::SignIn => "/users/sign_in",
        }
    }
}

/// Three-way outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    DenyRedirect(RedirectTarget),
    DenyUnauthenticated,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Converts the decision into a `Result` for `?` propagation
    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Decision::Allow => Ok(()),
            Decision::DenyRedirect(RedirectTarget::Root) => Err(Denial::NotOwner),
            Decision::DenyRedirect(RedirectTarget::SignIn) | Decision::DenyUnauthenticated => {
                Err(Denial::Unauthenticated)
            }
        }
    }
}

/// Error form of a denied [`Decision`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    /// No authenticated actor
    #[error("Authentication required")]
    Unauthenticated,

    /// Actor does not own the resource, or the resource does not exist
    #[error("Not authorized to access this resource")]
    NotOwner,
}

/// Decides whether `actor` may perform `operation` on `target`
pub fn authorize(actor: Option<&Actor>, target: Target, operation: Operation) -> Decision {
    let Some(actor) = actor else {
        tracing::debug!(operation = %operation, "Denied: no authenticated actor");
        return Decision::DenyUnauthenticated;
    };

    let decision = match target {
        Target::OwnScope => match operation {
            Operation::Create | Operation::List => Decision::Allow,
            // Record-level operations always name a concrete resource
            _ => Decision::DenyRedirect(RedirectTarget::Root),
        },
        Target::Owned(owner_id) if owner_id == actor.user_id => Decision::Allow,
        Target::Owned(_) | Target::Missing => Decision::DenyRedirect(RedirectTarget::Root),
    };

    if decision.is_allowed() {
        tracing::debug!(user_id = %actor.user_id, operation = %operation, "Access granted");
    } else {
        tracing::warn!(
            user_id = %actor.user_id,
            operation = %operation,
            target = ?target,
            "Access denied"
        );
    }

    decision
}

/// Shorthand for `authorize(..).into_result()`
pub fn require(actor: Option<&Actor>, target: Target, operation: Operation) -> Result<(), Denial> {
    authorize(actor, target, operation).into_result()
}
