use loyalty_common::Points;
use thiserror::Error;

use crate::{
    db_types::{Balance, OrderNumber, Withdrawal},
    helpers::OrderNumberError,
};

#[derive(Debug, Clone, Error)]
pub enum WithdrawalError {
    #[error("Insufficient funds. Requested {requested}, but only {available} is available")]
    InsufficientFunds { requested: Points, available: Points },
    #[error("Invalid order number. {0}")]
    InvalidOrderNumber(#[from] OrderNumberError),
    #[error("Withdrawal amounts must be positive, but {0} was requested")]
    InvalidAmount(Points),
    #[error("A withdrawal for order {0} has already been made")]
    Conflict(OrderNumber),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for WithdrawalError {
    fn from(e: sqlx::Error) -> Self {
        WithdrawalError::DatabaseError(e.to_string())
    }
}

/// Reading and debiting user balances.
///
/// Balances are credited exclusively through [`crate::traits::OrderCrediting`]; this trait is the only way to spend
/// them.
#[allow(async_fn_in_trait)]
pub trait BalanceManagement {
    /// Returns the user's balance. Users without a balance record have a zero balance.
    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, WithdrawalError>;

    /// Debits `sum` from the user's current balance and appends a withdrawal record, in a single transaction.
    ///
    /// The available balance is re-checked while holding the write lock on the user's balance, so any balance check
    /// made by the caller beforehand is advisory only. If the current balance is less than `sum` at that point,
    /// [`WithdrawalError::InsufficientFunds`] is returned and nothing is written.
    async fn withdraw(&self, user_id: i64, order_number: &OrderNumber, sum: Points)
        -> Result<Withdrawal, WithdrawalError>;

    /// All withdrawals made by the user, newest first.
    async fn fetch_withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, WithdrawalError>;
}
