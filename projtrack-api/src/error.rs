/// Error handling for the API server
///
/// Handlers return `Result<T, ApiError>`; the error renders itself as the
/// HTTP response. Authorization denials are not 4xx errors here: they
/// become `302 Found` redirects with a flash-style JSON body, so a browser
/// lands on the sign-in page or the dashboard.
///
/// # Example
///
/// ```
/// use projtrack_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(found: bool) -> ApiResult<Json<Value>> {
///     if !found {
///         return Err(ApiError::RedirectHome);
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use projtrack_shared::auth::authorization::{Denial, RedirectTarget};
use projtrack_shared::auth::jwt::JwtError;
use projtrack_shared::auth::password::PasswordError;
use projtrack_shared::store::StoreError;
use projtrack_shared::validation::ValidationResult;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Flash shown when a guest reaches a protected route
pub const SIGN_IN_NOTICE: &str = "You need to sign in or sign up before continuing.";

/// Flash shown when a user reaches a resource they do not own
pub const NOT_AUTHORIZED_ALERT: &str = "You are not authorized to access that project.";

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// No actor: redirect (302) to the sign-in page
    SignInRequired,

    /// Not the owner, or no such resource: redirect (302) to the root page
    RedirectHome,

    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401), wrong credentials on sign-in or refresh
    Unauthorized(String),

    /// Conflict (409), e.g. duplicate email on sign-up
    Conflict(String),

    /// Unprocessable entity (422)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message, e.g. "can't be blank"
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "validation_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Field errors, present on validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::SignInRequired => write!(f, "Sign in required"),
            ApiError::RedirectHome => write!(f, "Not authorized"),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// `302 Found` to `location` with a small JSON flash body
pub fn redirect(location: &'static str, flash_key: &str, message: &str) -> Response {
    let mut response = (StatusCode::FOUND, Json(json!({ flash_key: message }))).into_response();
    response
        .headers_mut()
        .insert(header::LOCATION, HeaderValue::from_static(location));
    response
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::SignInRequired => {
                return redirect(RedirectTarget::SignIn.path(), "notice", SIGN_IN_NOTICE);
            }
            ApiError::RedirectHome => {
                return redirect(RedirectTarget::Root.path(), "alert", NOT_AUTHORIZED_ALERT);
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => {
                let message = errors
                    .iter()
                    .map(|e| format!("{} {}", humanize(&e.field), e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "validation_error",
                    message,
                    Some(errors),
                )
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg, None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => ApiError::SignInRequired,
            Denial::NotOwner => ApiError::RedirectHome,
        }
    }
}

impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        ApiError::ValidationError(
            result
                .iter()
                .flat_map(|(field, errors)| {
                    errors
                        .iter()
                        .map(move |e| ValidationErrorDetail::new(field, e.to_string()))
                })
                .collect(),
        )
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "is invalid".to_string());
                    ValidationErrorDetail::new(field.to_string(), message)
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

/// A store-level name collision is a lost uniqueness race
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateName => ValidationResult::duplicate_name().into(),
            StoreError::DuplicateEmail => {
                ApiError::ValidationError(vec![ValidationErrorDetail::new(
                    "email",
                    "has already been taken",
                )])
            }
            StoreError::Database(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projtrack_shared::validation::ValidationErrorKind;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");
        assert_eq!(ApiError::SignInRequired.to_string(), "Sign in required");
    }

    #[test]
    fn test_sign_in_required_redirects() {
        let response = ApiError::SignInRequired.into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/users/sign_in");
    }

    #[test]
    fn test_redirect_home_redirects_to_root() {
        let response = ApiError::RedirectHome.into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[test]
    fn test_denials_map_to_redirects() {
        assert!(matches!(ApiError::from(Denial::Unauthenticated), ApiError::SignInRequired));
        assert!(matches!(
            ApiError::from(Denial::NotOwner),
            ApiError::RedirectHome
        ));
    }

    #[test]
    fn test_validation_result_conversion() {
        let mut result = ValidationResult::new();
        result.push(ValidationErrorKind::BlankField { field: "name" });

        match ApiError::from(result) {
            ApiError::ValidationError(details) => {
                assert_eq!(details, vec![ValidationErrorDetail::new("name", "can't be blank")]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_store_duplicate_name_is_validation_error() {
        let response = ApiError::from(StoreError::DuplicateName).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_store_database_error_is_internal() {
        let response = ApiError::from(StoreError::Database("down".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
