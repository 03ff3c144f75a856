//! Category endpoints

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use super::common::NameRequest;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, ValidId};
use crate::http::server::AppState;
use crate::models::{Category, Name};

/// Category response
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

/// GET /categories - list all categories
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.store().list_categories().await?;
    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// POST /categories - create a category (duplicate names allowed)
async fn create_category(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NameRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let name = Name::required(req.name.as_deref())?;
    let category = state.store().create_category(&name).await?;
    tracing::info!(category_id = category.id, "category created");

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// GET /categories/{category_id}
async fn get_category(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .store()
        .get_category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("category", id))?;

    Ok(Json(CategoryResponse::from(category)))
}

/// PATCH /categories/{category_id} - rename; the name is checked before the lookup
async fn update_category(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    JsonBody(req): JsonBody<NameRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let name = Name::required(req.name.as_deref())?;

    if state.store().rename_category(id, &name).await? == 0 {
        return Err(ApiError::not_found("category", id));
    }
    tracing::info!(category_id = id, "category renamed");

    let category = state
        .store()
        .get_category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("category", id))?;

    Ok(Json(CategoryResponse::from(category)))
}

/// DELETE /categories/{category_id}
///
/// Expenses labelled with the category keep their label.
async fn delete_category(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_category(id).await? == 0 {
        return Err(ApiError::not_found("category", id));
    }
    tracing::info!(category_id = id, "category deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Category routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{category_id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}
