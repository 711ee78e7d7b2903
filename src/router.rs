use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full application router: public routes, then everything else behind the
/// bearer-token layer.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(user_routes())
        .merge(course_routes())
        .merge(group_routes())
        .merge(task_routes())
        .merge(commit_routes())
        .merge(review_routes())
        .merge(message_routes())
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected
        .merge(protected)
        .with_state(state.clone());

    if let Some(cors) = cors_layer(&state.config.security) {
        router = router.layer(cors);
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/user/register", post(public::register_post))
        .route("/user/login", post(public::login_post))
}

fn user_routes() -> Router<AppState> {
    use protected::user;

    Router::new()
        .route("/user", get(user::me_get))
        .route("/user/courses", get(user::courses_get))
        .route("/user/tasks", get(user::tasks_get))
        .route("/user/:id", get(user::user_get))
}

fn course_routes() -> Router<AppState> {
    use protected::course;

    Router::new()
        .route("/course", get(course::course_list).post(course::course_post))
        .route("/course/:id", get(course::course_get).patch(course::course_patch))
        .route("/course/:id/join", post(course::course_join))
        .route("/course/:id/groups", get(course::course_groups))
}

fn group_routes() -> Router<AppState> {
    use protected::group;

    Router::new()
        .route("/group", post(group::group_post))
        .route("/group/:id", get(group::group_get).patch(group::group_patch))
        .route("/group/:id/join", post(group::group_join))
        .route("/group/:id/members", get(group::group_members))
}

fn task_routes() -> Router<AppState> {
    use protected::task;

    Router::new()
        .route("/task", get(task::task_list).post(task::task_post))
        .route("/task/:id", get(task::task_get).patch(task::task_patch))
}

fn commit_routes() -> Router<AppState> {
    use protected::commit;

    Router::new().route("/commit", get(commit::commit_list).post(commit::commit_post))
}

fn review_routes() -> Router<AppState> {
    use protected::review;

    Router::new()
        .route("/review", get(review::review_list))
        .route(
            "/review/group/:group_id",
            get(review::review_group_get).post(review::review_post),
        )
}

fn message_routes() -> Router<AppState> {
    use protected::message;

    Router::new().route("/message", get(message::message_list).post(message::message_post))
}

/// `None` when CORS is disabled. `*` in the origin list allows any origin.
fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Meet Team API",
            "version": version,
            "description": "Course and team collaboration backend",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "account": "/user/register, /user/login (public)",
                "user": "/user, /user/:id, /user/courses, /user/tasks (protected)",
                "course": "/course[/:id[/join|/groups]] (protected)",
                "group": "/group[/:id[/join|/members]] (protected)",
                "task": "/task[/:id] (protected)",
                "commit": "/commit (protected)",
                "review": "/review, /review/group/:group_id (protected)",
                "message": "/message (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
