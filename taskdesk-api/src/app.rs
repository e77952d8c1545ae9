/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use taskdesk_shared::auth::{jwt, middleware::authenticate};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Largest accepted upload request body
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Signs a fresh bearer token for a user
    pub fn issue_token(&self, user_id: uuid::Uuid) -> Result<String, jwt::JwtError> {
        let claims = jwt::Claims::with_expiration(
            user_id,
            Duration::hours(self.config.jwt.expiration_hours),
        );
        jwt::create_token(&claims, self.jwt_secret())
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /                          # Liveness banner (public)
/// ├── GET /health                    # Health check (public)
/// ├── /uploads/*                     # Uploaded images (public, static)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register         # public
///     │   ├── POST /login            # public
///     │   ├── POST /upload-image     # public, multipart
///     │   ├── GET  /profile
///     │   └── PUT  /profile[/:id]
///     ├── /users/
///     │   ├── GET    /               # admin
///     │   ├── GET    /:id
///     │   └── DELETE /:id            # admin
///     ├── /tasks/
///     │   ├── GET  /                 # ?status=
///     │   ├── POST /                 # admin
///     │   ├── GET  /dashboard-tasks  # admin
///     │   ├── GET  /user-dashboard-tasks
///     │   ├── GET | PUT | DELETE /:id
///     │   ├── PUT  /:id/status       # assignee or admin
///     │   └── PUT  /:id/todo         # assignee or admin
///     └── /reports/                  # admin, XLSX
///         ├── GET /export-tasks
///         └── GET /export-users
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer, origins from `CLIENT_URL`)
/// 3. Bearer authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route(
            "/upload-image",
            post(routes::uploads::upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        );

    let protected_auth_routes = Router::new()
        .route(
            "/profile",
            get(routes::auth::get_profile).put(routes::auth::update_own_profile),
        )
        .route("/profile/:id", put(routes::auth::update_profile))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route(
            "/:id",
            get(routes::users::get_user).delete(routes::users::delete_user),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/dashboard-tasks", get(routes::tasks::dashboard))
        .route("/user-dashboard-tasks", get(routes::tasks::user_dashboard))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/status", put(routes::tasks::update_task_status))
        .route("/:id/todo", put(routes::tasks::update_task_checklist))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let report_routes = Router::new()
        .route("/export-tasks", get(routes::reports::export_tasks))
        .route("/export-users", get(routes::reports::export_users))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(protected_auth_routes))
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .nest("/reports", report_routes);

    Router::new()
        .route("/", get(routes::health::banner))
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.uploads.dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// CORS from `CLIENT_URL`
fn cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_permissive() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer authentication layer
///
/// Validates the token, loads the user it names and injects an
/// `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth = authenticate(&state.db, state.jwt_secret(), req.headers())
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, path = %req.uri().path(), "Authentication rejected");
            e
        })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
