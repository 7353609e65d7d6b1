/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use projtrack_api::{app::{build_router, AppState}, config::Config};
/// use projtrack_shared::store::MemoryStore;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use chrono::NaiveDate;
use projtrack_shared::auth::middleware::create_actor_middleware;
use projtrack_shared::auth::password::HashParams;
use projtrack_shared::status::{Clock, SystemClock};
use projtrack_shared::store::ResourceStore;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Users, projects and tasks
    pub store: Arc<dyn ResourceStore>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Source of "today" for the late flag
    pub clock: Arc<dyn Clock>,

    /// Argon2 cost for new password hashes
    pub hash_params: HashParams,
}

impl AppState {
    /// State with the system clock in the configured zone and production
    /// hashing cost
    pub fn new(store: Arc<dyn ResourceStore>, config: Config) -> Self {
        let clock = SystemClock::with_offset_hours(config.calendar.utc_offset_hours)
            .unwrap_or_else(SystemClock::utc);

        Self {
            store,
            config: Arc::new(config),
            clock: Arc::new(clock),
            hash_params: HashParams::production(),
        }
    }

    /// Replaces the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the password hashing cost
    pub fn with_hash_params(mut self, params: HashParams) -> Self {
        self.hash_params = params;
        self
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Today's date according to the configured clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET    /                                   # Dashboard (public)
/// ├── GET    /health                             # Health check (public)
/// ├── /users
/// │   ├── GET    /sign_in                        # Sign-in page (public)
/// │   ├── POST   /sign_in
/// │   ├── POST   /sign_up
/// │   ├── POST   /refresh
/// │   └── DELETE /                               # Delete own account
/// └── /projects
///     ├── GET | POST              /
///     ├── GET | PATCH | PUT | DELETE /:project_id
///     ├── GET | POST              /:project_id/tasks
///     └── GET | PATCH | PUT | DELETE /:project_id/tasks/:task_id
/// ```
///
/// # Middleware Stack
///
/// Every route runs behind the actor middleware, which never rejects; each
/// handler asks the ownership gate itself. Outer layers, innermost first:
/// actor resolution, tracing, CORS, security headers.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let user_routes = Router::new()
        .route("/", delete(routes::users::delete_account))
        .route(
            "/sign_in",
            get(routes::users::sign_in_page).post(routes::users::sign_in),
        )
        .route("/sign_up", post(routes::users::sign_up))
        .route("/refresh", post(routes::users::refresh));

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:project_id",
            get(routes::projects::show_project)
                .patch(routes::projects::update_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/:project_id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:project_id/tasks/:task_id",
            get(routes::tasks::show_task)
                .patch(routes::tasks::update_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    let cors = if state.config.api.cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers([header::LOCATION])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/", get(routes::home::dashboard))
        .route("/health", get(routes::health::health_check))
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .layer(axum::middleware::from_fn(create_actor_middleware(
            state.jwt_secret().to_string(),
            state.store.clone(),
        )))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
