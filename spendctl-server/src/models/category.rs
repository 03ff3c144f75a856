//! Category record
//!
//! Expenses refer to categories by label only; there is no foreign key
//! and duplicate names are allowed.

use sqlx::FromRow;

/// Category record from storage
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}
