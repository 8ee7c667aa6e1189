//! Registering orders on behalf of users.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderNumber},
    helpers::validate_order_number,
    ledger_api::errors::OrderApiError,
    traits::{InsertOrderResult, OrderManagement},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOrderResult {
    /// The order is new and will be picked up by the reconciliation worker.
    Accepted(Order),
    /// The user had already registered this order. Nothing changed.
    AlreadyRegistered(Order),
}

pub struct OrderApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi ({:?})", self.db)
    }
}

impl<B> OrderApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Registers an order for the user.
    ///
    /// The order number is validated with the Luhn check-digit algorithm before anything is written. An order number
    /// can only belong to one user; registering someone else's order fails with
    /// [`OrderApiError::OwnedByAnotherUser`].
    pub async fn register_order(&self, user_id: i64, number: &str) -> Result<RegisterOrderResult, OrderApiError> {
        let number = number.trim();
        validate_order_number(number)?;
        let number = OrderNumber::from(number);
        match self.db.insert_order(user_id, &number).await? {
            InsertOrderResult::Inserted(order) => {
                info!("📦️ User {user_id} registered order {number}");
                Ok(RegisterOrderResult::Accepted(order))
            },
            InsertOrderResult::AlreadyExists(order) if order.user_id == user_id => {
                debug!("📦️ User {user_id} registered order {number} again");
                Ok(RegisterOrderResult::AlreadyRegistered(order))
            },
            InsertOrderResult::AlreadyExists(order) => {
                warn!("📦️ User {user_id} tried to register order {number}, which belongs to user {}", order.user_id);
                Err(OrderApiError::OwnedByAnotherUser(number))
            },
        }
    }

    /// The user's orders, newest first.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderApiError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        trace!("📦️ User {user_id} has {} orders", orders.len());
        Ok(orders)
    }
}
