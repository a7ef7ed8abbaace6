use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use tracing::debug;
use uuid::Uuid;

use thoughtline_types::api::AddReactionRequest;
use thoughtline_types::validate::NewReaction;

use crate::{AppError, AppState, parse_thought_id, run_db};

/// Adds a reaction unless the same author already left the same body.
pub async fn add_reaction(
    State(state): State<AppState>,
    Path(thought_id): Path<String>,
    payload: Result<Json<AddReactionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_thought_id(&thought_id)?;
    let Json(req) = payload?;
    let new = NewReaction::new(req.reaction_body.as_deref(), req.username.as_deref())?;

    let thought = run_db(&state, move |db| db.add_reaction(id, &new)).await?;
    debug!("Thought {} now has {} reactions", id, thought.reactions.len());
    Ok(Json(thought))
}

/// Unknown or malformed reaction ids are not an error; the thought comes
/// back unchanged.
pub async fn remove_reaction(
    State(state): State<AppState>,
    Path((thought_id, reaction_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_thought_id(&thought_id)?;
    // Stored ids are lowercase hyphenated; any other spelling of a UUID matches too.
    let reaction_key = match reaction_id.parse::<Uuid>() {
        Ok(parsed) => parsed.to_string(),
        Err(_) => reaction_id,
    };
    let thought = run_db(&state, move |db| db.remove_reaction(id, &reaction_key)).await?;
    Ok(Json(thought))
}
