//! PostgreSQL store
//!
//! - list: single SELECT, predicates appended only when the filter sets them
//! - update: SET clause built from the fields present in the patch
//! - update/delete: rows affected are returned as-is

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{DbError, Store};
use crate::models::{Category, Expense, ExpenseFilter, ExpensePatch, Name, NewExpense, User};

const EXPENSE_COLUMNS: &str = "id, user_id, spent_at, title, amount, category, note";

/// Store backed by a sqlx connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as("SELECT id, name FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn create_user(&self, name: &Name) -> Result<User, DbError> {
        let user = sqlx::query_as("INSERT INTO users (name) VALUES ($1) RETURNING id, name")
            .bind(name.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as("SELECT id, name FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn rename_user(&self, id: i64, name: &Name) -> Result<u64, DbError> {
        let result = sqlx::query("UPDATE users SET name = $1 WHERE id = $2")
            .bind(name.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_user(&self, id: i64) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn user_exists(&self, id: i64) -> Result<bool, DbError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists.0)
    }

    async fn list_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, DbError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE 1=1"
        ));

        if let Some(user_id) = filter.user_id {
            builder.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(from) = filter.from {
            builder.push(" AND spent_at >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            builder.push(" AND spent_at <= ").push_bind(to);
        }
        if let Some(categories) = &filter.categories {
            builder
                .push(" AND category = ANY(")
                .push_bind(categories.clone())
                .push(")");
        }
        builder.push(" ORDER BY id");

        let expenses: Vec<Expense> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(expenses)
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, DbError> {
        let created = sqlx::query_as(&format!(
            r#"
            INSERT INTO expenses (user_id, spent_at, title, amount, category, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EXPENSE_COLUMNS}
            "#
        ))
        .bind(expense.user_id)
        .bind(expense.spent_at)
        .bind(&expense.title)
        .bind(expense.amount)
        .bind(expense.category.as_deref())
        .bind(expense.note.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn get_expense(&self, id: i64) -> Result<Option<Expense>, DbError> {
        let expense = sqlx::query_as(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(expense)
    }

    async fn update_expense(&self, id: i64, patch: &ExpensePatch) -> Result<u64, DbError> {
        if patch.is_empty() {
            return Ok(u64::from(self.get_expense(id).await?.is_some()));
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE expenses SET ");
        {
            let mut fields = builder.separated(", ");
            if let Some(user_id) = patch.user_id {
                fields.push("user_id = ").push_bind_unseparated(user_id);
            }
            if let Some(spent_at) = patch.spent_at {
                fields.push("spent_at = ").push_bind_unseparated(spent_at);
            }
            if let Some(title) = &patch.title {
                fields.push("title = ").push_bind_unseparated(title.clone());
            }
            if let Some(amount) = patch.amount {
                fields.push("amount = ").push_bind_unseparated(amount);
            }
            if let Some(category) = &patch.category {
                fields.push("category = ").push_bind_unseparated(category.clone());
            }
            if let Some(note) = &patch.note {
                fields.push("note = ").push_bind_unseparated(note.clone());
            }
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_expense(&self, id: i64) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        let categories = sqlx::query_as("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn create_category(&self, name: &Name) -> Result<Category, DbError> {
        let category =
            sqlx::query_as("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
                .bind(name.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(category)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, DbError> {
        let category = sqlx::query_as("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn rename_category(&self, id: i64, name: &Name) -> Result<u64, DbError> {
        let result = sqlx::query("UPDATE categories SET name = $1 WHERE id = $2")
            .bind(name.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_category(&self, id: i64) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
