pub mod error;
pub mod friends;
pub mod reactions;
pub mod thoughts;
pub mod users;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{delete, get, post},
};
use tracing::error;
use uuid::Uuid;

use thoughtline_db::{Database, DbResult};

pub use error::AppError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

/// Full application: the CRUD surface under `/api` plus `/health`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router(state))
        .route("/health", get(health))
}

/// The CRUD routes, relative to the API root.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/users", get(users::get_users).post(users::create_user))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/{user_id}/friends/{friend_id}",
            post(friends::add_friend).delete(friends::remove_friend),
        )
        .route(
            "/thoughts",
            get(thoughts::get_thoughts).post(thoughts::create_thought),
        )
        .route(
            "/thoughts/{thought_id}",
            get(thoughts::get_thought)
                .put(thoughts::update_thought)
                .delete(thoughts::delete_thought),
        )
        .route(
            "/thoughts/{thought_id}/reactions",
            post(reactions::add_reaction),
        )
        .route(
            "/thoughts/{thought_id}/reactions/{reaction_id}",
            delete(reactions::remove_reaction),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run a blocking DB call off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AppError::Internal("Internal server error".into())
        })?
        .map_err(AppError::from)
}

/// User routes reject malformed ids up front.
pub(crate) fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID format!".into()))
}

/// A malformed thought id cannot match any thought.
pub(crate) fn parse_thought_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound("No thought found with this id!".into()))
}
