use chrono::Utc;
use log::{debug, trace};
use loyalty_common::Points;
use sqlx::SqliteConnection;

use super::is_unique_violation;
use crate::{
    db_types::{Order, OrderNumber, OrderStatusType, PendingOrder},
    traits::{InsertOrderResult, LedgerError},
};

/// Inserts the order into the database, returning the existing order instead if the number is already taken.
///
/// Two registrations of the same number can race between the lookup and the insert. The loser of that race hits the
/// UNIQUE constraint on `number` and gets the winner's order back.
pub async fn idempotent_insert(
    user_id: i64,
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<InsertOrderResult, LedgerError> {
    if let Some(order) = fetch_order_by_number(number, conn).await? {
        return Ok(InsertOrderResult::AlreadyExists(order));
    }
    match insert_order(user_id, number, conn).await {
        Ok(order) => {
            debug!("📝️ Order {number} inserted with id {} for user {user_id}", order.id);
            Ok(InsertOrderResult::Inserted(order))
        },
        Err(e) if is_unique_violation(&e) => {
            trace!("📝️ Order {number} was inserted concurrently. Returning the existing record");
            fetch_order_by_number(number, conn)
                .await?
                .map(InsertOrderResult::AlreadyExists)
                .ok_or_else(|| LedgerError::OrderNotFound(number.clone()))
        },
        Err(e) => Err(e.into()),
    }
}

/// Inserts a new order with status `NEW`. This is not atomic. You can embed this call inside a transaction if you need
/// to ensure atomicity, and pass `&mut tx` as the connection argument.
async fn insert_order(user_id: i64, number: &OrderNumber, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as(
        r#"
            INSERT INTO orders (number, user_id, status, created_at, updated_at)
            VALUES ($1, $2, 'NEW', $3, $3)
            RETURNING *;
        "#,
    )
    .bind(number.as_str())
    .bind(user_id)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE number = $1").bind(number.as_str()).fetch_optional(conn).await
}

pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    trace!("📝️ Fetched {} orders for user {user_id}", orders.len());
    Ok(orders)
}

/// Every order that is still waiting for a verdict, oldest first.
pub async fn fetch_pending_orders(conn: &mut SqliteConnection) -> Result<Vec<PendingOrder>, sqlx::Error> {
    sqlx::query_as("SELECT number, user_id, status FROM orders WHERE status IN ('NEW', 'PROCESSING') ORDER BY id ASC")
        .fetch_all(conn)
        .await
}

/// Sets the status and accrual of an order, but only while the order is still `NEW` or `PROCESSING`.
///
/// Returns `false` if no row was changed, i.e. the order does not exist, belongs to someone else, or has already
/// reached a terminal state.
pub async fn update_pending_order(
    number: &OrderNumber,
    user_id: i64,
    status: OrderStatusType,
    accrual: Option<Points>,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE orders SET status = $1, accrual = $2, updated_at = $3
            WHERE number = $4 AND user_id = $5 AND status IN ('NEW', 'PROCESSING')
        "#,
    )
    .bind(status.as_str())
    .bind(accrual)
    .bind(Utc::now())
    .bind(number.as_str())
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
