use loyalty_common::Points;
use serde::Serialize;

use crate::db_types::{Order, OrderStatusType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOrderResult {
    Inserted(Order),
    AlreadyExists(Order),
}

impl InsertOrderResult {
    pub fn order(&self) -> &Order {
        match self {
            Self::Inserted(o) | Self::AlreadyExists(o) => o,
        }
    }
}

/// The result of applying a verdict to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CreditOutcome {
    /// The order moved to `status`. `credited` is the amount added to the user's balance (zero unless `PROCESSED`).
    Applied { status: OrderStatusType, credited: Points },
    /// The order was already `INVALID` or `PROCESSED` (or no longer exists as a pending order), so nothing changed.
    AlreadyFinal,
}
