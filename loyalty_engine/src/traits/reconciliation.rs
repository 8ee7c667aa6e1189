use loyalty_common::Points;
use thiserror::Error;

use crate::{
    db_types::{OrderNumber, OrderStatusType, PendingOrder},
    traits::data_objects::CreditOutcome,
};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("The credit cannot be applied. {0}")]
    InvalidCredit(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

/// The read side of reconciliation: which orders are still waiting for a verdict from the accrual authority.
#[allow(async_fn_in_trait)]
pub trait PendingOrders {
    /// Lists every order with status `NEW` or `PROCESSING`. Terminal orders are never returned.
    async fn list_pending_orders(&self) -> Result<Vec<PendingOrder>, LedgerError>;
}

/// The write side of reconciliation. Only the reconciliation worker should hold an implementation of this trait.
#[allow(async_fn_in_trait)]
pub trait OrderCrediting {
    /// Applies a verdict to an order in a single atomic transaction:
    /// * The order's status and accrual are updated, provided the order is still `NEW` or `PROCESSING`.
    /// * If the new status is `PROCESSED`, the user's current balance is increased by `accrual`.
    ///
    /// `accrual` must be present and positive if and only if `status` is `PROCESSED`. Otherwise
    /// [`LedgerError::InvalidCredit`] is returned and nothing is written.
    ///
    /// If the order has already reached a terminal state, nothing is written and [`CreditOutcome::AlreadyFinal`] is
    /// returned, so applying the same verdict twice credits the balance once.
    async fn credit_order(
        &self,
        order_number: &OrderNumber,
        user_id: i64,
        status: OrderStatusType,
        accrual: Option<Points>,
    ) -> Result<CreditOutcome, LedgerError>;
}
