/// Payload validation for projects and tasks
///
/// Validation is a pure function of the candidate payload and a read view of
/// the sibling resources it must be unique against. The caller loads that
/// view (see [`ExistingScope`]); nothing here touches the store.
///
/// # Rules
///
/// - Project: `name` must be present and non-blank (`BlankField`).
/// - Project: `name` must not match, exactly and case-sensitively, the name of
///   another project owned by the same owner (`DuplicateInScope`).
/// - Task: `name` must be present and non-blank. No uniqueness.
///
/// Validation never aborts the caller. It returns a [`ValidationResult`]
/// holding zero or more field-level errors and the caller decides what the
/// user sees.
///
/// # Example
///
/// ```
/// use projtrack_shared::validation::{
///     validate, ExistingScope, Payload, ProjectPayload, ValidationErrorKind,
/// };
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let scope = ExistingScope::new(owner, vec![(Uuid::new_v4(), "Test Project".to_string())]);
///
/// let result = validate(
///     &Payload::Project(ProjectPayload::create(owner, Some("Test Project"))),
///     &scope,
/// );
/// assert_eq!(
///     result.errors_for("name"),
///     &[ValidationErrorKind::DuplicateInScope { field: "name", scope: "owner" }]
/// );
/// ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Field name checked for presence and uniqueness
pub const NAME_FIELD: &str = "name";

/// Scope label for per-owner uniqueness
pub const OWNER_SCOPE: &str = "owner";

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Required field is missing, empty, or whitespace only
    #[error("can't be blank")]
    BlankField { field: &'static str },

    /// Field value already used by a sibling in the same scope
    #[error("has already been taken")]
    DuplicateInScope {
        field: &'static str,
        scope: &'static str,
    },
}

impl ValidationErrorKind {
    /// The field this error is attached to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationErrorKind::BlankField { field } => field,
            ValidationErrorKind::DuplicateInScope { field, .. } => field,
        }
    }
}

/// Outcome of validating one payload
///
/// Maps each field name to the ordered list of errors raised against it.
/// Fields iterate in name order; errors within a field keep the order in
/// which the rules ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    errors: BTreeMap<&'static str, Vec<ValidationErrorKind>>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result representing a per-owner name collision
    ///
    /// Used when the store's unique constraint rejects a write that passed the
    /// pre-check, so a lost race surfaces exactly like a detected duplicate.
    pub fn duplicate_name() -> Self {
        let mut result = Self::new();
        result.push(ValidationErrorKind::DuplicateInScope {
            field: NAME_FIELD,
            scope: OWNER_SCOPE,
        });
        result
    }

    /// Records an error against its field
    pub fn push(&mut self, error: ValidationErrorKind) {
        self.errors.entry(error.field()).or_default().push(error);
    }

    /// True when no rule failed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors recorded for `field`, empty if none
    pub fn errors_for(&self, field: &str) -> &[ValidationErrorKind] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates `(field, errors)` in field order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[ValidationErrorKind])> {
        self.errors.iter().map(|(field, errors)| (*field, errors.as_slice()))
    }

    /// Human-readable messages such as `"Name can't be blank"`
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .flat_map(|(field, errors)| {
                errors
                    .iter()
                    .map(move |error| format!("{} {}", humanize(field), error))
            })
            .collect()
    }

    /// `Ok(())` when valid, otherwise the result itself as the error
    pub fn into_result(self) -> Result<(), ValidationResult> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "valid");
        }
        write!(f, "{}", self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationResult {}

fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Candidate project data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPayload {
    /// ID of the project being updated, None for a create
    pub id: Option<Uuid>,

    /// Owner the project will belong to (always the acting user)
    pub owner_id: Uuid,

    /// Candidate name, None when absent from the request
    pub name: Option<String>,
}

impl ProjectPayload {
    /// Payload for creating a project owned by `owner_id`
    pub fn create(owner_id: Uuid, name: Option<&str>) -> Self {
        Self {
            id: None,
            owner_id,
            name: name.map(str::to_string),
        }
    }

    /// Payload for updating project `id`
    pub fn update(id: Uuid, owner_id: Uuid, name: Option<&str>) -> Self {
        Self {
            id: Some(id),
            owner_id,
            name: name.map(str::to_string),
        }
    }
}

/// Candidate task data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPayload {
    pub name: Option<String>,
}

impl TaskPayload {
    pub fn new(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
        }
    }
}

/// Tagged payload fed to [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Project(ProjectPayload),
    Task(TaskPayload),
}

/// One sibling project visible to the uniqueness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeEntry {
    pub id: Uuid,
    pub name: String,
}

/// Read view of the projects owned by one user
///
/// Supplied by the caller; entries are only compared against payloads with
/// the same `owner_id`, so a name taken by one owner is always free for
/// another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingScope {
    owner_id: Option<Uuid>,
    entries: Vec<ScopeEntry>,
}

impl ExistingScope {
    /// Scope of the projects owned by `owner_id`, given as `(id, name)` pairs
    pub fn new(owner_id: Uuid, entries: Vec<(Uuid, String)>) -> Self {
        Self {
            owner_id: Some(owner_id),
            entries: entries
                .into_iter()
                .map(|(id, name)| ScopeEntry { id, name })
                .collect(),
        }
    }

    /// Scope with no siblings
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn owner_id(&self) -> Option<Uuid> {
        self.owner_id
    }

    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    /// Whether another project of `owner_id` already uses `name`
    ///
    /// `exclude` is the project being updated; it never conflicts with itself.
    fn is_taken(&self, owner_id: Uuid, name: &str, exclude: Option<Uuid>) -> bool {
        if self.owner_id != Some(owner_id) {
            return false;
        }
        self.entries
            .iter()
            .filter(|entry| Some(entry.id) != exclude)
            .any(|entry| entry.name == name)
    }
}

/// Validates a project or task payload against its rules
pub fn validate(payload: &Payload, scope: &ExistingScope) -> ValidationResult {
    let mut result = ValidationResult::new();

    match payload {
        Payload::Project(project) => {
            match present(project.name.as_deref()) {
                None => result.push(ValidationErrorKind::BlankField { field: NAME_FIELD }),
                Some(name) => {
                    if scope.is_taken(project.owner_id, name, project.id) {
                        result.push(ValidationErrorKind::DuplicateInScope {
                            field: NAME_FIELD,
                            scope: OWNER_SCOPE,
                        });
                    }
                }
            }
        }
        Payload::Task(task) => {
            if present(task.name.as_deref()).is_none() {
                result.push(ValidationErrorKind::BlankField { field: NAME_FIELD });
            }
        }
    }

    if !result.is_valid() {
        tracing::debug!(errors = %result, "Payload failed validation");
    }

    result
}

/// Returns the value if it has any non-whitespace content
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope_with(owner: Uuid, names: &[&str]) -> ExistingScope {
        ExistingScope::new(
            owner,
            names
                .iter()
                .map(|n| (Uuid::new_v4(), n.to_string()))
                .collect(),
        )
    }

    fn blank() -> ValidationErrorKind {
        ValidationErrorKind::BlankField { field: "name" }
    }

    fn duplicate() -> ValidationErrorKind {
        ValidationErrorKind::DuplicateInScope {
            field: "name",
            scope: "owner",
        }
    }

    #[test]
    fn test_project_with_unique_name_is_valid() {
        let owner = Uuid::new_v4();
        let result = validate(
            &Payload::Project(ProjectPayload::create(owner, Some("Test Project"))),
            &scope_with(owner, &["Other Project"]),
        );
        assert!(result.is_valid());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_project_without_name_is_invalid() {
        let owner = Uuid::new_v4();
        for name in [None, Some(""), Some("   ")] {
            let result = validate(
                &Payload::Project(ProjectPayload::create(owner, name)),
                &ExistingScope::empty(),
            );
            assert_eq!(result.errors_for("name"), &[blank()], "name = {:?}", name);
        }
    }

    #[test]
    fn test_duplicate_name_for_same_owner_is_invalid() {
        let owner = Uuid::new_v4();
        let result = validate(
            &Payload::Project(ProjectPayload::create(owner, Some("Test Project"))),
            &scope_with(owner, &["Test Project"]),
        );
        assert_eq!(result.errors_for("name"), &[duplicate()]);
        assert_eq!(result.full_messages(), vec!["Name has already been taken"]);
    }

    #[test]
    fn test_two_owners_may_share_a_name() {
        let owner = Uuid::new_v4();
        let other_owner = Uuid::new_v4();
        let result = validate(
            &Payload::Project(ProjectPayload::create(other_owner, Some("Test Project"))),
            &scope_with(owner, &["Test Project"]),
        );
        assert!(result.is_valid());
    }

    #[test]
    fn test_uniqueness_is_case_sensitive() {
        let owner = Uuid::new_v4();
        let result = validate(
            &Payload::Project(ProjectPayload::create(owner, Some("test project"))),
            &scope_with(owner, &["Test Project"]),
        );
        assert!(result.is_valid());
    }

    #[test]
    fn test_update_does_not_conflict_with_itself() {
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();
        let scope = ExistingScope::new(owner, vec![(id, "Same Old Name".to_string())]);

        let keep = validate(
            &Payload::Project(ProjectPayload::update(id, owner, Some("Same Old Name"))),
            &scope,
        );
        assert!(keep.is_valid());

        let steal = validate(
            &Payload::Project(ProjectPayload::update(Uuid::new_v4(), owner, Some("Same Old Name"))),
            &scope,
        );
        assert_eq!(steal.errors_for("name"), &[duplicate()]);
    }

    #[test]
    fn test_task_requires_name_only() {
        let ok = validate(
            &Payload::Task(TaskPayload::new(Some("Test task"))),
            &ExistingScope::empty(),
        );
        assert!(ok.is_valid());

        let missing = validate(&Payload::Task(TaskPayload::new(None)), &ExistingScope::empty());
        assert_eq!(missing.errors_for("name"), &[blank()]);
        assert_eq!(missing.full_messages(), vec!["Name can't be blank"]);
    }

    #[test]
    fn test_tasks_ignore_project_scope() {
        let owner = Uuid::new_v4();
        let result = validate(
            &Payload::Task(TaskPayload::new(Some("Test Project"))),
            &scope_with(owner, &["Test Project"]),
        );
        assert!(result.is_valid());
    }

    #[test]
    fn test_duplicate_name_result_matches_precheck() {
        let owner = Uuid::new_v4();
        let precheck = validate(
            &Payload::Project(ProjectPayload::create(owner, Some("Race"))),
            &scope_with(owner, &["Race"]),
        );
        assert_eq!(precheck, ValidationResult::duplicate_name());
    }

    #[test]
    fn test_result_serializes_field_map() {
        let json = serde_json::to_value(ValidationResult::duplicate_name()).unwrap();
        assert_eq!(json["errors"]["name"][0]["kind"], "duplicate_in_scope");
        assert_eq!(json["errors"]["name"][0]["scope"], "owner");
    }

    #[test]
    fn test_display() {
        assert_eq!(ValidationResult::new().to_string(), "valid");
        assert_eq!(
            ValidationResult::duplicate_name().to_string(),
            "Name has already been taken"
        );
    }
}
