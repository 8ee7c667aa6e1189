use chrono::{DateTime, Utc};
use loyalty_common::Points;
use loyalty_engine::db_types::{Order, OrderNumber, OrderStatusType, Withdrawal};
use serde::{Deserialize, Serialize};

/// An order as the user sees it. `accrual` is only present once the order is `PROCESSED`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub number: OrderNumber,
    pub status: OrderStatusType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let accrual = order.accrual.filter(|_| order.status == OrderStatusType::Processed);
        Self { number: order.number, status: order.status, accrual, uploaded_at: order.created_at }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub order: String,
    pub sum: Points,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalResponse {
    pub order: OrderNumber,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalResponse {
    fn from(w: Withdrawal) -> Self {
        Self { order: w.order_number, sum: w.sum, processed_at: w.created_at }
    }
}
