use chrono::Utc;
use loyalty_common::Points;
use sqlx::SqliteConnection;

use crate::db_types::{OrderNumber, Withdrawal};

/// Appends a withdrawal record. A second withdrawal for the same order number violates the UNIQUE constraint on
/// `order_number`.
pub async fn insert_withdrawal(
    user_id: i64,
    order_number: &OrderNumber,
    sum: Points,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO withdrawals (user_id, order_number, sum, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(order_number.as_str())
    .bind(sum)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
}

pub async fn fetch_withdrawals_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Withdrawal>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM withdrawals WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await
}
