//! Storage port shared by the Postgres and in-memory adapters

use async_trait::async_trait;

use crate::models::{Category, Expense, ExpenseFilter, ExpensePatch, Name, NewExpense, User};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence operations used by the HTTP handlers.
///
/// Lists come back in insertion order. `rename_*`, `update_*` and `delete_*`
/// return the number of rows affected; zero means the id did not exist.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend label reported by `/health` (no I/O).
    fn backend(&self) -> &'static str;

    async fn list_users(&self) -> Result<Vec<User>, DbError>;
    async fn create_user(&self, name: &Name) -> Result<User, DbError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, DbError>;
    async fn rename_user(&self, id: i64, name: &Name) -> Result<u64, DbError>;
    async fn delete_user(&self, id: i64) -> Result<u64, DbError>;

    async fn list_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, DbError>;
    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, DbError>;
    async fn get_expense(&self, id: i64) -> Result<Option<Expense>, DbError>;
    async fn update_expense(&self, id: i64, patch: &ExpensePatch) -> Result<u64, DbError>;
    async fn delete_expense(&self, id: i64) -> Result<u64, DbError>;

    async fn list_categories(&self) -> Result<Vec<Category>, DbError>;
    async fn create_category(&self, name: &Name) -> Result<Category, DbError>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>, DbError>;
    async fn rename_category(&self, id: i64, name: &Name) -> Result<u64, DbError>;
    async fn delete_category(&self, id: i64) -> Result<u64, DbError>;

    /// Existence check used before writes that reference a user.
    async fn user_exists(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.get_user(id).await?.is_some())
    }
}
