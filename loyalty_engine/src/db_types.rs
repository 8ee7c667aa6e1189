use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use loyalty_common::Points;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been registered, but the accrual authority has not reported on it yet.
    New,
    /// The accrual authority is still calculating the reward for the order.
    Processing,
    /// The accrual authority refused to reward the order. Terminal.
    Invalid,
    /// The reward has been calculated and credited to the user's balance. Terminal.
    Processed,
    /// A status reported by the accrual authority that we do not recognise. It is never stored.
    Undefined,
}

impl OrderStatusType {
    /// Maps a status string reported by the accrual authority onto an order status.
    ///
    /// This never fails. Anything outside the known vocabulary becomes [`OrderStatusType::Undefined`], which the
    /// reconciliation worker treats as "leave the order alone and ask again next cycle".
    pub fn decode(external_status: &str) -> Self {
        external_status.parse().unwrap_or(Self::Undefined)
    }

    /// `Invalid` and `Processed` orders are never reconciled again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }

    /// `New` and `Processing` orders are waiting for a verdict from the accrual authority.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::New | Self::Processing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Processing => "PROCESSING",
            Self::Invalid => "INVALID",
            Self::Processed => "PROCESSED",
            Self::Undefined => "UNDEFINED",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            "UNDEFINED" => Ok(Self::Undefined),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------      OrderNumber      ---------------------------------------------------------
/// The externally issued order number. Check-digit validation happens at the API boundary, see
/// [`crate::helpers::luhn`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderNumber(pub String);

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub number: OrderNumber,
    pub user_id: i64,
    pub status: OrderStatusType,
    pub accrual: Option<Points>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     PendingOrder      ---------------------------------------------------------
/// The unit of work for one reconciliation cycle. It is not persisted; it names an order awaiting a verdict.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PendingOrder {
    pub number: OrderNumber,
    pub user_id: i64,
    pub status: OrderStatusType,
}

impl PendingOrder {
    pub fn new<N: Into<OrderNumber>>(number: N, user_id: i64, status: OrderStatusType) -> Self {
        Self { number: number.into(), user_id, status }
    }
}

//--------------------------------------        Balance        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct Balance {
    pub current: Points,
    pub withdrawn: Points,
}

impl Balance {
    pub fn new(current: Points, withdrawn: Points) -> Self {
        Self { current, withdrawn }
    }
}

//--------------------------------------      Withdrawal       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Withdrawal {
    pub id: i64,
    pub user_id: i64,
    pub order_number: OrderNumber,
    pub sum: Points,
    pub created_at: DateTime<Utc>,
}
