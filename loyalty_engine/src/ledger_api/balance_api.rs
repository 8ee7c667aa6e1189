//! Balances and withdrawals.
use std::fmt::Debug;

use log::*;
use loyalty_common::Points;

use crate::{
    db_types::{Balance, OrderNumber, Withdrawal},
    helpers::validate_order_number,
    traits::{BalanceManagement, WithdrawalError},
};

pub struct BalanceApi<B> {
    db: B,
}

impl<B: Debug> Debug for BalanceApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BalanceApi ({:?})", self.db)
    }
}

impl<B> BalanceApi<B>
where B: BalanceManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn balance(&self, user_id: i64) -> Result<Balance, WithdrawalError> {
        self.db.fetch_balance(user_id).await
    }

    /// Spends `sum` points of the user's balance on the order `order_number`.
    ///
    /// The order number must pass the Luhn check, but it does not have to be an order that was registered for
    /// accrual. The balance check made here only spares the database a doomed write. The authoritative check happens
    /// inside [`BalanceManagement::withdraw`].
    pub async fn withdraw(&self, user_id: i64, order_number: &str, sum: Points) -> Result<Withdrawal, WithdrawalError> {
        let order_number = order_number.trim();
        validate_order_number(order_number)?;
        if !sum.is_positive() {
            return Err(WithdrawalError::InvalidAmount(sum));
        }
        let order_number = OrderNumber::from(order_number);
        let balance = self.db.fetch_balance(user_id).await?;
        if balance.current < sum {
            debug!("💰️ User {user_id} cannot withdraw {sum}. Current balance is {}", balance.current);
            return Err(WithdrawalError::InsufficientFunds { requested: sum, available: balance.current });
        }
        let withdrawal = self.db.withdraw(user_id, &order_number, sum).await?;
        info!("💰️ User {user_id} spent {sum} points on order {order_number}");
        Ok(withdrawal)
    }

    /// The user's withdrawals, newest first.
    pub async fn withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, WithdrawalError> {
        self.db.fetch_withdrawals(user_id).await
    }
}
