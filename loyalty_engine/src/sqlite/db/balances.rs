use chrono::Utc;
use log::trace;
use loyalty_common::Points;
use sqlx::SqliteConnection;

use crate::db_types::Balance;

/// Creates a zero balance for the user if they do not have one yet.
pub async fn ensure_balance(user_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO balances (user_id) VALUES ($1)").bind(user_id).execute(conn).await?;
    Ok(())
}

pub async fn fetch_balance(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Balance>, sqlx::Error> {
    sqlx::query_as("SELECT current, withdrawn FROM balances WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

/// Adds `amount` to the user's current balance, creating the balance record if it is missing.
pub async fn credit_balance(user_id: i64, amount: Points, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO balances (user_id, current, updated_at) VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET current = current + excluded.current, updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    trace!("💰️ Credited {amount} to user {user_id}");
    Ok(())
}

/// Moves `sum` from the user's current balance to their withdrawn total, if and only if the current balance covers it.
///
/// The check and the update are a single statement, so when this is the first statement of a transaction the check is
/// made while holding the database write lock. Returns `false` if the balance was insufficient (or missing) and
/// nothing changed.
pub async fn debit_balance(user_id: i64, sum: Points, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE balances SET current = current - $1, withdrawn = withdrawn + $1, updated_at = $2
            WHERE user_id = $3 AND current >= $1
        "#,
    )
    .bind(sum)
    .bind(Utc::now())
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
