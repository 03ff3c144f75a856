//! Domain models with validation at construction
//!
//! Request input is turned into these types before it reaches storage.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod name;
pub mod timestamp;
pub mod user;
pub mod category;
pub mod expense;

pub use validation::ValidationError;
pub use name::Name;
pub use timestamp::{parse_timestamp, BoundKind};
pub use user::User;
pub use category::Category;
pub use expense::{Expense, ExpenseFilter, ExpensePatch, NewExpense};
