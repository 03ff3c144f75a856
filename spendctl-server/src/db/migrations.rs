//! Schema setup for the users, categories and expenses tables

use sqlx::PgPool;

use super::DbError;

/// Run all migrations. Safe to call on every start.
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running spendctl migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // No FK on user_id: deleting a user leaves its expenses in place.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS expenses (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL,
            spent_at TIMESTAMPTZ NOT NULL,
            title VARCHAR(255) NOT NULL,
            amount DOUBLE PRECISION NOT NULL,
            category VARCHAR(255),
            note TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_expenses_user_id ON expenses(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_expenses_spent_at ON expenses(spent_at)",
        "CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category)",
    ] {
        sqlx::query(index).execute(pool).await?;
    }

    tracing::info!("Migrations complete");
    Ok(())
}
