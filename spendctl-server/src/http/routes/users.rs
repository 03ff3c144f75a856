//! User endpoints

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use super::common::NameRequest;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, ValidId};
use crate::http::server::AppState;
use crate::models::{Name, User};

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
        }
    }
}

/// GET /users - list all users
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.store().list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /users - create a user
async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NameRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let name = Name::required(req.name.as_deref())?;
    let user = state.store().create_user(&name).await?;
    tracing::info!(user_id = user.id, "user created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /users/{user_id} - get a single user
async fn get_user(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user", id))?;

    Ok(Json(UserResponse::from(user)))
}

/// PATCH /users/{user_id} - rename a user
async fn update_user(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    JsonBody(req): JsonBody<NameRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let name = Name::required(req.name.as_deref())?;

    if state.store().rename_user(id, &name).await? == 0 {
        return Err(ApiError::not_found("user", id));
    }
    tracing::info!(user_id = id, "user renamed");

    let user = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user", id))?;

    Ok(Json(UserResponse::from(user)))
}

/// DELETE /users/{user_id} - delete a user (their expenses are kept)
async fn delete_user(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_user(id).await? == 0 {
        return Err(ApiError::not_found("user", id));
    }
    tracing::info!(user_id = id, "user deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// User routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{user_id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}
