//! `SqliteDatabase` is the concrete ledger store of the loyalty engine.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
//!
//! SQLite has no row locks. Every compound write below opens a transaction whose *first* statement is a write, so the
//! database write lock is taken before anything is read, and concurrent writers queue on it (for up to the connection's
//! busy timeout) instead of working from a stale snapshot.
use std::fmt::Debug;

use log::*;
use loyalty_common::Points;
use sqlx::{migrate, SqlitePool};

use super::db::{balances, is_unique_violation, new_pool, orders, withdrawals};
use crate::{
    db_types::{Balance, Order, OrderNumber, OrderStatusType, PendingOrder, Withdrawal},
    traits::{
        BalanceManagement,
        CreditOutcome,
        InsertOrderResult,
        LedgerError,
        OrderCrediting,
        OrderManagement,
        PendingOrders,
        WithdrawalError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        debug!("🗃️ Connected to {url}");
        Ok(Self { pool })
    }

    /// Applies any outstanding schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        debug!("🗃️ Database connection pool closed");
    }
}

impl PendingOrders for SqliteDatabase {
    async fn list_pending_orders(&self) -> Result<Vec<PendingOrder>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let pending = orders::fetch_pending_orders(&mut conn).await?;
        trace!("🗃️ {} orders are awaiting a verdict", pending.len());
        Ok(pending)
    }
}

impl OrderCrediting for SqliteDatabase {
    async fn credit_order(
        &self,
        order_number: &OrderNumber,
        user_id: i64,
        status: OrderStatusType,
        accrual: Option<Points>,
    ) -> Result<CreditOutcome, LedgerError> {
        let credited = check_credit(order_number, status, accrual)?;
        let mut tx = self.pool.begin().await?;
        if !orders::update_pending_order(order_number, user_id, status, accrual, &mut tx).await? {
            debug!("🗃️ Order {order_number} is no longer pending. Verdict {status} ignored");
            return Ok(CreditOutcome::AlreadyFinal);
        }
        if credited.is_positive() {
            balances::credit_balance(user_id, credited, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order {order_number} is now {status}. {credited} credited to user {user_id}");
        Ok(CreditOutcome::Applied { status, credited })
    }
}

/// Returns the amount to credit for the verdict, or an error if the status and accrual do not belong together.
fn check_credit(
    order_number: &OrderNumber,
    status: OrderStatusType,
    accrual: Option<Points>,
) -> Result<Points, LedgerError> {
    use OrderStatusType::*;
    match (status, accrual) {
        (Processed, Some(a)) if a.is_positive() => Ok(a),
        (Processed, a) => Err(LedgerError::InvalidCredit(format!(
            "Order {order_number} is PROCESSED but has no positive accrual ({a:?})"
        ))),
        (Undefined, _) => Err(LedgerError::InvalidCredit(format!("Order {order_number} cannot be set to {status}"))),
        (_, Some(a)) => {
            Err(LedgerError::InvalidCredit(format!("Order {order_number} is {status} but carries an accrual of {a}")))
        },
        (_, None) => Ok(Points::ZERO),
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, user_id: i64, number: &OrderNumber) -> Result<InsertOrderResult, LedgerError> {
        let mut tx = self.pool.begin().await?;
        balances::ensure_balance(user_id, &mut tx).await?;
        let result = orders::idempotent_insert(user_id, number, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }
}

impl BalanceManagement for SqliteDatabase {
    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, WithdrawalError> {
        let mut conn = self.pool.acquire().await?;
        let balance = balances::fetch_balance(user_id, &mut conn).await?;
        Ok(balance.unwrap_or_default())
    }

    async fn withdraw(
        &self,
        user_id: i64,
        order_number: &OrderNumber,
        sum: Points,
    ) -> Result<Withdrawal, WithdrawalError> {
        if !sum.is_positive() {
            return Err(WithdrawalError::InvalidAmount(sum));
        }
        let mut tx = self.pool.begin().await?;
        if !balances::debit_balance(user_id, sum, &mut tx).await? {
            let available = balances::fetch_balance(user_id, &mut tx).await?.unwrap_or_default().current;
            info!("🗃️ User {user_id} tried to withdraw {sum} for order {order_number}, but only has {available}");
            return Err(WithdrawalError::InsufficientFunds { requested: sum, available });
        }
        let withdrawal = match withdrawals::insert_withdrawal(user_id, order_number, sum, &mut tx).await {
            Ok(w) => w,
            Err(e) if is_unique_violation(&e) => {
                info!("🗃️ A withdrawal for order {order_number} already exists. User {user_id}'s request is refused");
                return Err(WithdrawalError::Conflict(order_number.clone()));
            },
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;
        debug!("🗃️ User {user_id} withdrew {sum} for order {order_number}");
        Ok(withdrawal)
    }

    async fn fetch_withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, WithdrawalError> {
        let mut conn = self.pool.acquire().await?;
        let withdrawals = withdrawals::fetch_withdrawals_for_user(user_id, &mut conn).await?;
        Ok(withdrawals)
    }
}
