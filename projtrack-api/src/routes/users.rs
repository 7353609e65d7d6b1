/// Account endpoints
///
/// - `GET /users/sign_in` - Describe the sign-in form (redirect target for guests)
/// - `POST /users/sign_up` - Register and receive tokens
/// - `POST /users/sign_in` - Sign in and receive tokens
/// - `POST /users/refresh` - Exchange a refresh token for an access token
/// - `DELETE /users` - Cancel the signed-in account with everything it owns
///
/// Tokens go in `Authorization: Bearer <access_token>` on later requests.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use projtrack_shared::{
    auth::{
        jwt,
        middleware::CurrentActor,
        password,
    },
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

/// Sign-up request
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub last_name: String,

    #[validate(email(message = "is invalid"))]
    pub email: String,

    /// Checked against the password length policy
    pub password: String,
}

/// Sign-in request
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "is invalid"))]
    pub email: String,

    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Public view of an account
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name(),
            email: user.email.clone(),
        }
    }
}

/// Response to sign-up and sign-in
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub notice: String,

    pub user: UserSummary,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn issue_session(state: &AppState, user: &User, notice: &str) -> ApiResult<SessionResponse> {
    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    Ok(SessionResponse {
        notice: notice.to_string(),
        user: UserSummary::from(user),
        access_token: jwt::create_token(&access_claims, state.jwt_secret())?,
        refresh_token: jwt::create_token(&refresh_claims, state.jwt_secret())?,
    })
}

/// Sign-in page
///
/// Guests are redirected here, so it always answers `200` and describes how
/// to sign in.
///
/// ```text
/// GET /users/sign_in
/// ```
pub async fn sign_in_page(CurrentActor(actor): CurrentActor) -> Json<Value> {
    Json(json!({
        "signed_in": actor.is_some(),
        "sign_in": {
            "method": "POST",
            "path": "/users/sign_in",
            "fields": ["email", "password"],
        },
        "sign_up": {
            "method": "POST",
            "path": "/users/sign_up",
            "fields": ["first_name", "last_name", "email", "password"],
        },
    }))
}

/// Register a new account
///
/// ```text
/// POST /users/sign_up
/// Content-Type: application/json
///
/// {
///   "first_name": "Jane",
///   "last_name": "Tester",
///   "email": "jane@example.com",
///   "password": "dottle-nouveau"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: field errors, including a taken email
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let mut details = match req.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => match ApiError::from(errors) {
            ApiError::ValidationError(details) => details,
            other => return Err(other),
        },
    };

    if let Err(message) = password::validate_password_strength(&req.password) {
        details.push(ValidationErrorDetail::new("password", message));
    }

    if !details.is_empty() {
        return Err(ApiError::ValidationError(details));
    }

    let password_hash = password::hash_password(&req.password, &state.hash_params)?;

    let user = state
        .store
        .create_user(CreateUser {
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User signed up");

    let session = issue_session(&state, &user, "Welcome! You have signed up successfully.")?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Sign in with email and password
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password (indistinguishable)
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate()?;

    let user = state
        .store
        .find_user_by_email(req.email.trim())
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Sign-in with wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    tracing::info!(user_id = %user.id, "User signed in");

    Ok(Json(issue_session(&state, &user, "Signed in successfully.")?))
}

/// Exchange a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: invalid, expired, or non-refresh token, or the
///   account was cancelled
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;
    if state.store.find_user(claims.sub).await?.is_none() {
        return Err(ApiError::Unauthorized("Account no longer exists".to_string()));
    }

    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Cancel the signed-in account
///
/// Deletes the user, every project they own, and every task in those
/// projects. Tokens already issued stop resolving to an owner of anything.
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Value>> {
    let actor = actor.ok_or(ApiError::SignInRequired)?;

    if !state.store.delete_user(actor.user_id).await? {
        return Err(ApiError::SignInRequired);
    }

    tracing::info!(user_id = %actor.user_id, "Account cancelled");

    Ok(Json(json!({
        "notice": "Bye! Your account has been successfully cancelled."
    })))
}
