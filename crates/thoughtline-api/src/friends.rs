//! Friend list mutation. Friendship is one-directional: adding B to A's
//! friends leaves B's list alone.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use crate::{AppError, AppState, parse_user_id, run_db};

fn parse_pair(user_id: &str, friend_id: &str) -> Result<(Uuid, Uuid), AppError> {
    match (parse_user_id(user_id), parse_user_id(friend_id)) {
        (Ok(user), Ok(friend)) => Ok((user, friend)),
        _ => Err(AppError::BadRequest(
            "Invalid user or friend ID format!".into(),
        )),
    }
}

pub async fn add_friend(
    State(state): State<AppState>,
    Path((user_id, friend_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (user, friend) = parse_pair(&user_id, &friend_id)?;
    let updated = run_db(&state, move |db| db.add_friend(user, friend)).await?;
    info!("User {} added friend {}", user, friend);
    Ok(Json(updated))
}

pub async fn remove_friend(
    State(state): State<AppState>,
    Path((user_id, friend_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (user, friend) = parse_pair(&user_id, &friend_id)?;
    let updated = run_db(&state, move |db| db.remove_friend(user, friend)).await?;
    Ok(Json(updated))
}
