//! Expense records, validated inputs and list filters

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::name::bounded_text;
use super::ValidationError;

/// Expense record from storage
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub spent_at: DateTime<Utc>,
    pub title: String,
    pub amount: f64,
    pub category: Option<String>,
    pub note: Option<String>,
}

/// Validated input for a new expense
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub user_id: i64,
    pub spent_at: DateTime<Utc>,
    pub title: String,
    pub amount: f64,
    pub category: Option<String>,
    pub note: Option<String>,
}

/// Fields to change on an existing expense.
///
/// `None` leaves the column untouched. For the nullable columns the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub user_id: Option<i64>,
    pub spent_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Option<String>>,
    pub note: Option<Option<String>>,
}

impl ExpensePatch {
    /// True when no updatable field is set.
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.spent_at.is_none()
            && self.title.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.note.is_none()
    }

    /// Apply the patch to a record in place.
    pub fn apply(&self, expense: &mut Expense) {
        if let Some(user_id) = self.user_id {
            expense.user_id = user_id;
        }
        if let Some(spent_at) = self.spent_at {
            expense.spent_at = spent_at;
        }
        if let Some(title) = &self.title {
            expense.title = title.clone();
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(category) = &self.category {
            expense.category = category.clone();
        }
        if let Some(note) = &self.note {
            expense.note = note.clone();
        }
    }
}

/// Conjunctive filter for listing expenses. `None` omits the predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    pub user_id: Option<i64>,
    /// Inclusive lower bound on `spent_at`
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `spent_at`
    pub to: Option<DateTime<Utc>>,
    /// Category labels; an expense matches if its label is one of these
    pub categories: Option<Vec<String>>,
}

impl ExpenseFilter {
    /// Evaluate the filter against a single record.
    pub fn matches(&self, expense: &Expense) -> bool {
        if self.user_id.is_some_and(|id| id != expense.user_id) {
            return false;
        }
        if self.from.is_some_and(|from| expense.spent_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| expense.spent_at > to) {
            return false;
        }
        match (&self.categories, &expense.category) {
            (None, _) => true,
            (Some(wanted), Some(label)) => wanted.iter().any(|c| c == label),
            (Some(_), None) => false,
        }
    }
}

/// Split a comma-separated category list, trimming each element.
pub fn split_categories(raw: &str) -> Vec<String> {
    raw.split(',').map(|c| c.trim().to_owned()).collect()
}

/// Validate a required expense title.
pub fn validate_title(raw: &str) -> Result<String, ValidationError> {
    bounded_text("title", raw)
}

/// Normalize an optional category label: blank means no category.
pub fn optional_label(raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    match raw {
        Some(s) if !s.trim().is_empty() => bounded_text("category", s).map(Some),
        _ => Ok(None),
    }
}

/// Normalize an optional note: blank means no note.
pub fn optional_note(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty()).map(str::to_owned)
}

/// Check a numeric amount is usable.
pub fn validate_amount(amount: f64) -> Result<f64, ValidationError> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(ValidationError::InvalidFormat {
            field: "amount",
            reason: "must be a finite number",
        })
    }
}
