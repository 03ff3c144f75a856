//! User record

use sqlx::FromRow;

/// User record from storage
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
}
