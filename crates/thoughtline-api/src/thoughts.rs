use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use thoughtline_types::api::{CreateThoughtRequest, MessageResponse, UpdateThoughtRequest};
use thoughtline_types::validate::{NewThought, ThoughtChanges};

use crate::{AppError, AppState, parse_thought_id, run_db};

pub async fn get_thoughts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let thoughts = run_db(&state, |db| db.list_thoughts()).await?;
    Ok(Json(thoughts))
}

pub async fn get_thought(
    State(state): State<AppState>,
    Path(thought_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_thought_id(&thought_id)?;
    let thought = run_db(&state, move |db| db.get_thought(id)).await?;
    Ok(Json(thought))
}

/// POST /thoughts: stores the thought and appends it to the owner's list.
/// Nothing is written when the owner does not exist.
pub async fn create_thought(
    State(state): State<AppState>,
    payload: Result<Json<CreateThoughtRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;

    let (Some(user_id), Some(text), Some(username)) = (req.user_id, req.thought_text, req.username)
    else {
        return Err(AppError::BadRequest(
            "userId, thoughtText and username are required".into(),
        ));
    };
    let user_id: Uuid = user_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID format!".into()))?;
    let new = NewThought::new(user_id, &text, &username)?;

    let thought = run_db(&state, move |db| db.create_thought(&new)).await?;
    info!("Created thought {} for user {}", thought.id, user_id);

    Ok((StatusCode::CREATED, Json(thought)))
}

pub async fn update_thought(
    State(state): State<AppState>,
    Path(thought_id): Path<String>,
    payload: Result<Json<UpdateThoughtRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_thought_id(&thought_id)?;
    let Json(req) = payload?;
    let changes = ThoughtChanges::new(req.thought_text.as_deref(), req.username.as_deref())?;

    let thought = run_db(&state, move |db| db.update_thought(id, &changes)).await?;
    Ok(Json(thought))
}

pub async fn delete_thought(
    State(state): State<AppState>,
    Path(thought_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_thought_id(&thought_id)?;
    run_db(&state, move |db| db.delete_thought(id)).await?;
    info!("Deleted thought {}", id);

    Ok(Json(MessageResponse::new("Thought deleted!")))
}
