//! Route handlers organized by resource

pub mod categories;
pub mod common;
pub mod expenses;
pub mod health;
pub mod users;
