use thiserror::Error;

use crate::{db_types::OrderNumber, helpers::OrderNumberError, traits::LedgerError};

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("Invalid order number. {0}")]
    InvalidOrderNumber(#[from] OrderNumberError),
    #[error("Order {0} has already been registered by another user")]
    OwnedByAnotherUser(OrderNumber),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<LedgerError> for OrderApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::DatabaseError(s) => Self::DatabaseError(s),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}
