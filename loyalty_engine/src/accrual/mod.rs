//! # Accrual gateway
//!
//! The accrual authority is the external service that decides how many points an order is worth. The engine only ever
//! asks it one question: "what is the verdict for order N?". [`AccrualGateway`] is that question, and [`AccrualClient`]
//! asks it over HTTP.
//!
//! The gateway never retries and never sleeps. Rate limiting is reported back as [`GatewayError::RateLimited`] and the
//! reconciliation worker decides what to do about it.
mod client;

use std::time::Duration;

pub use client::{AccrualClient, AccrualConfig};
use loyalty_common::Points;
use thiserror::Error;

use crate::db_types::{OrderNumber, OrderStatusType};

/// The accrual authority's decision on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub status: OrderStatusType,
    pub accrual: Option<Points>,
}

impl Verdict {
    pub fn new(status: OrderStatusType, accrual: Option<Points>) -> Self {
        Self { status, accrual }
    }

    pub fn processed(accrual: Points) -> Self {
        Self::new(OrderStatusType::Processed, Some(accrual))
    }

    pub fn invalid() -> Self {
        Self::new(OrderStatusType::Invalid, None)
    }

    pub fn processing() -> Self {
        Self::new(OrderStatusType::Processing, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("The accrual authority does not have a verdict for this order yet")]
    NotReady,
    #[error("The accrual authority is rate limiting us. Retry in {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },
    #[error("Could not get a verdict from the accrual authority. {0}")]
    Transient(String),
}

#[allow(async_fn_in_trait)]
pub trait AccrualGateway {
    /// Makes exactly one request to the accrual authority for the given order.
    async fn fetch_verdict(&self, order_number: &OrderNumber) -> Result<Verdict, GatewayError>;
}
