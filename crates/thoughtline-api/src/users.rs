use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info};

use thoughtline_types::api::{CreateUserRequest, MessageResponse, UpdateUserRequest};
use thoughtline_types::validate::{NewUser, UserChanges};

use crate::{AppError, AppState, parse_user_id, run_db};

/// GET /users: every user with thoughts and friends populated.
pub async fn get_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = run_db(&state, |db| db.list_users()).await?;
    debug!("Listed {} users", users.len());
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_user_id(&user_id)?;
    let user = run_db(&state, move |db| db.get_user(id)).await?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let new = NewUser::new(req.username.as_deref(), req.email.as_deref())?;

    let user = run_db(&state, move |db| db.create_user(&new)).await?;
    info!("Created user {} ({})", user.username, user.id);

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_user_id(&user_id)?;
    let Json(req) = payload?;
    let changes = UserChanges::new(req.username.as_deref(), req.email.as_deref())?;

    let user = run_db(&state, move |db| db.update_user(id, &changes)).await?;
    Ok(Json(user))
}

/// DELETE /users/{user_id}: also removes the user's thoughts.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_user_id(&user_id)?;
    let removed = run_db(&state, move |db| db.delete_user(id)).await?;
    info!("Deleted user {} and {} thoughts", id, removed);

    Ok(Json(MessageResponse::new(
        "User and associated thoughts deleted!",
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::test_support::{TestApp, create_user};

    #[tokio::test]
    async fn create_user_returns_201_with_empty_lists() {
        let app = TestApp::new();
        let (status, body) = app
            .send("POST", "/api/users", Some(json!({ "username": "ann", "email": "ann@example.com" })))
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "ann");
        assert_eq!(body["friends"], json!([]));
        assert_eq!(body["thoughts"], json!([]));
        assert_eq!(body["friendCount"], 0);
        assert!(body["_id"].is_string());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_without_insert() {
        let app = TestApp::new();
        create_user(&app, "ann").await;

        let (status, body) = app
            .send("POST", "/api/users", Some(json!({ "username": "ann", "email": "other@example.com" })))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "username is already taken");

        let (_, all) = app.send("GET", "/api/users", None).await;
        assert_eq!(all.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_email_is_a_validation_error() {
        let app = TestApp::new();
        let (status, body) = app
            .send("POST", "/api/users", Some(json!({ "username": "ann", "email": "nope" })))
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Please enter a valid email address");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = TestApp::new();
        let (status, body) = app.send_raw("POST", "/api/users", "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn get_user_validates_id_format() {
        let app = TestApp::new();

        let (status, body) = app.send("GET", "/api/users/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid user ID format!");

        let missing = uuid::Uuid::new_v4();
        let (status, body) = app.send("GET", &format!("/api/users/{}", missing), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No user found with this id!");
    }

    #[tokio::test]
    async fn update_user_changes_supplied_fields() {
        let app = TestApp::new();
        let id = create_user(&app, "ann").await;

        let (status, body) = app
            .send("PUT", &format!("/api/users/{}", id), Some(json!({ "username": "  annie " })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "annie");
        assert_eq!(body["email"], "ann@example.com");

        let missing = uuid::Uuid::new_v4();
        let (status, _) = app
            .send("PUT", &format!("/api/users/{}", missing), Some(json!({ "username": "x" })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_user_returns_confirmation() {
        let app = TestApp::new();
        let id = create_user(&app, "ann").await;

        let (status, body) = app.send("DELETE", &format!("/api/users/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "User and associated thoughts deleted!" }));

        let (status, _) = app.send("DELETE", &format!("/api/users/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.send("DELETE", "/api/users/123", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn end_to_end_user_thought_lifecycle() {
        let app = TestApp::new();
        let ann = create_user(&app, "ann").await;

        let (status, thought) = app
            .send(
                "POST",
                "/api/thoughts",
                Some(json!({ "userId": ann, "thoughtText": "hi", "username": "ann" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let thought_id = thought["_id"].clone();

        let (status, user) = app.send("GET", &format!("/api/users/{}", ann), None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<Value> = user["thoughts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["_id"].clone())
            .collect();
        assert_eq!(ids, vec![thought_id]);

        let (status, _) = app.send("DELETE", &format!("/api/users/{}", ann), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, thoughts) = app.send("GET", "/api/thoughts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(thoughts, json!([]));
    }
}
