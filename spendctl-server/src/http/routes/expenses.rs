//! Expense endpoints
//!
//! List filters: `userId`, `from`, `to` (inclusive), `categories` (comma list).
//! Creation and userId changes require the user to exist; a failed check is
//! reported exactly like a missing field.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use super::common::explicit;
use crate::db::Store;
use crate::http::error::{ApiError, EXPENSE_REJECTED};
use crate::http::extractors::{JsonBody, ValidId, ValidQuery};
use crate::http::server::AppState;
use crate::models::expense::{
    optional_label, optional_note, split_categories, validate_amount, validate_title,
};
use crate::models::{
    parse_timestamp, BoundKind, Expense, ExpenseFilter, ExpensePatch, NewExpense, ValidationError,
};

/// Query string of GET /expenses
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExpensesQuery {
    pub user_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub categories: Option<String>,
}

/// Blank parameters are treated as absent.
fn given(param: Option<String>) -> Option<String> {
    param.filter(|s| !s.trim().is_empty())
}

impl TryFrom<ListExpensesQuery> for ExpenseFilter {
    type Error = ValidationError;

    fn try_from(q: ListExpensesQuery) -> Result<Self, Self::Error> {
        let user_id = given(q.user_id)
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| ValidationError::InvalidFormat {
                        field: "userId",
                        reason: "must be an integer",
                    })
            })
            .transpose()?;
        let from = given(q.from)
            .map(|raw| parse_timestamp("from", &raw, BoundKind::Start))
            .transpose()?;
        let to = given(q.to)
            .map(|raw| parse_timestamp("to", &raw, BoundKind::End))
            .transpose()?;
        let categories = given(q.categories).map(|raw| split_categories(&raw));

        Ok(Self {
            user_id,
            from,
            to,
            categories,
        })
    }
}

/// Create expense request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub user_id: Option<i64>,
    pub spent_at: Option<String>,
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub note: Option<String>,
}

impl TryFrom<CreateExpenseRequest> for NewExpense {
    type Error = ValidationError;

    fn try_from(req: CreateExpenseRequest) -> Result<Self, Self::Error> {
        let user_id = req
            .user_id
            .ok_or(ValidationError::Missing { field: "userId" })?;
        let spent_at = req
            .spent_at
            .ok_or(ValidationError::Missing { field: "spentAt" })
            .and_then(|raw| parse_timestamp("spentAt", &raw, BoundKind::Start))?;
        let title = req
            .title
            .ok_or(ValidationError::Missing { field: "title" })
            .and_then(|raw| validate_title(&raw))?;
        let amount = req
            .amount
            .ok_or(ValidationError::Missing { field: "amount" })
            .and_then(validate_amount)?;

        Ok(Self {
            user_id,
            spent_at,
            title,
            amount,
            category: optional_label(req.category.as_deref())?,
            note: optional_note(req.note.as_deref()),
        })
    }
}

/// Update expense request.
///
/// Only these six fields are recognised; anything else in the body is ignored.
/// `category` and `note` may be set to null to clear them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    #[serde(default, deserialize_with = "explicit")]
    pub user_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "explicit")]
    pub spent_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit")]
    pub amount: Option<Option<f64>>,
    #[serde(default, deserialize_with = "explicit")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit")]
    pub note: Option<Option<String>>,
}

/// A present field that must not be null.
fn not_null<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::Missing { field })
}

impl TryFrom<UpdateExpenseRequest> for ExpensePatch {
    type Error = ValidationError;

    fn try_from(req: UpdateExpenseRequest) -> Result<Self, Self::Error> {
        let patch = Self {
            user_id: req
                .user_id
                .map(|v| not_null("userId", v))
                .transpose()?,
            spent_at: req
                .spent_at
                .map(|v| {
                    not_null("spentAt", v)
                        .and_then(|raw| parse_timestamp("spentAt", &raw, BoundKind::Start))
                })
                .transpose()?,
            title: req
                .title
                .map(|v| not_null("title", v).and_then(|raw| validate_title(&raw)))
                .transpose()?,
            amount: req
                .amount
                .map(|v| not_null("amount", v).and_then(validate_amount))
                .transpose()?,
            category: req
                .category
                .map(|v| optional_label(v.as_deref()))
                .transpose()?,
            note: req.note.map(|v| optional_note(v.as_deref())),
        };

        if patch.is_empty() {
            return Err(ValidationError::NoUpdatableFields);
        }
        Ok(patch)
    }
}

/// Expense response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    pub id: i64,
    pub user_id: i64,
    pub spent_at: String,
    pub title: String,
    pub amount: f64,
    pub category: Option<String>,
    pub note: Option<String>,
}

impl From<Expense> for ExpenseResponse {
    fn from(e: Expense) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            spent_at: e.spent_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            title: e.title,
            amount: e.amount,
            category: e.category,
            note: e.note,
        }
    }
}

/// Reject the write unless `user_id` names an existing user.
async fn ensure_user_exists(store: &dyn Store, user_id: i64) -> Result<(), ApiError> {
    if store.user_exists(user_id).await? {
        Ok(())
    } else {
        tracing::debug!(user_id, "expense references unknown user");
        Err(ApiError::bad_request(EXPENSE_REJECTED))
    }
}

/// GET /expenses - list expenses matching the query filters
async fn list_expenses(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListExpensesQuery>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let filter = ExpenseFilter::try_from(query)?;
    let expenses = state.store().list_expenses(&filter).await?;

    Ok(Json(expenses.into_iter().map(ExpenseResponse::from).collect()))
}

/// POST /expenses - create an expense for an existing user
///
/// Unreadable bodies, invalid fields and unknown users all answer "Bad Request".
async fn create_expense(
    State(state): State<AppState>,
    body: Result<JsonBody<CreateExpenseRequest>, ApiError>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    let JsonBody(req) = body.map_err(|_| ApiError::bad_request(EXPENSE_REJECTED))?;
    let expense = NewExpense::try_from(req).map_err(|e| {
        tracing::debug!(reason = %e, "rejected expense");
        ApiError::bad_request(EXPENSE_REJECTED)
    })?;
    ensure_user_exists(state.store(), expense.user_id).await?;

    let created = state.store().create_expense(&expense).await?;
    tracing::info!(expense_id = created.id, user_id = created.user_id, "expense created");

    Ok((StatusCode::CREATED, Json(ExpenseResponse::from(created))))
}

/// GET /expenses/{expense_id}
async fn get_expense(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let expense = state
        .store()
        .get_expense(id)
        .await?
        .ok_or_else(|| ApiError::not_found("expense", id))?;

    Ok(Json(ExpenseResponse::from(expense)))
}

/// PATCH /expenses/{expense_id} - partial update, re-fetched after write
async fn update_expense(
    State(state): State<AppState>,
    ValidId(id): ValidId,
    JsonBody(req): JsonBody<UpdateExpenseRequest>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let patch = ExpensePatch::try_from(req)?;
    if let Some(user_id) = patch.user_id {
        ensure_user_exists(state.store(), user_id).await?;
    }

    if state.store().update_expense(id, &patch).await? == 0 {
        return Err(ApiError::not_found("expense", id));
    }
    tracing::info!(expense_id = id, "expense updated");

    let expense = state
        .store()
        .get_expense(id)
        .await?
        .ok_or_else(|| ApiError::not_found("expense", id))?;

    Ok(Json(ExpenseResponse::from(expense)))
}

/// DELETE /expenses/{expense_id}
async fn delete_expense(
    State(state): State<AppState>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    if state.store().delete_expense(id).await? == 0 {
        return Err(ApiError::not_found("expense", id));
    }
    tracing::info!(expense_id = id, "expense deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Expense routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/{expense_id}",
            get(get_expense).patch(update_expense).delete(delete_expense),
        )
}
