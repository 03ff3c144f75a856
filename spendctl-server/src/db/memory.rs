//! In-process store
//!
//! Same contract as the Postgres store, kept in `BTreeMap`s so iteration
//! follows id (insertion) order. Used by the test suite and `serve --memory`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DbError, Store};
use crate::models::{Category, Expense, ExpenseFilter, ExpensePatch, Name, NewExpense, User};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    expenses: BTreeMap<i64, Expense>,
    categories: BTreeMap<i64, Category>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Store that keeps everything in memory for the lifetime of the process
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn create_user(&self, name: &Name) -> Result<User, DbError> {
        let mut tables = self.tables.write().await;
        let user = User {
            id: tables.allocate_id(),
            name: name.as_str().to_owned(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DbError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn rename_user(&self, id: i64, name: &Name) -> Result<u64, DbError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(&id) {
            Some(user) => {
                user.name = name.as_str().to_owned();
                1
            }
            None => 0,
        })
    }

    async fn delete_user(&self, id: i64) -> Result<u64, DbError> {
        let mut tables = self.tables.write().await;
        Ok(u64::from(tables.users.remove(&id).is_some()))
    }

    async fn list_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .expenses
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, DbError> {
        let mut tables = self.tables.write().await;
        let created = Expense {
            id: tables.allocate_id(),
            user_id: expense.user_id,
            spent_at: expense.spent_at,
            title: expense.title.clone(),
            amount: expense.amount,
            category: expense.category.clone(),
            note: expense.note.clone(),
        };
        tables.expenses.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_expense(&self, id: i64) -> Result<Option<Expense>, DbError> {
        Ok(self.tables.read().await.expenses.get(&id).cloned())
    }

    async fn update_expense(&self, id: i64, patch: &ExpensePatch) -> Result<u64, DbError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.expenses.get_mut(&id) {
            Some(expense) => {
                patch.apply(expense);
                1
            }
            None => 0,
        })
    }

    async fn delete_expense(&self, id: i64) -> Result<u64, DbError> {
        let mut tables = self.tables.write().await;
        Ok(u64::from(tables.expenses.remove(&id).is_some()))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        Ok(self.tables.read().await.categories.values().cloned().collect())
    }

    async fn create_category(&self, name: &Name) -> Result<Category, DbError> {
        let mut tables = self.tables.write().await;
        let category = Category {
            id: tables.allocate_id(),
            name: name.as_str().to_owned(),
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, DbError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn rename_category(&self, id: i64, name: &Name) -> Result<u64, DbError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.categories.get_mut(&id) {
            Some(category) => {
                category.name = name.as_str().to_owned();
                1
            }
            None => 0,
        })
    }

    async fn delete_category(&self, id: i64) -> Result<u64, DbError> {
        let mut tables = self.tables.write().await;
        Ok(u64::from(tables.categories.remove(&id).is_some()))
    }
}
