use crate::{
    db_types::{Order, OrderNumber},
    traits::{data_objects::InsertOrderResult, LedgerError},
};

/// Registering orders and looking them up.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order with status `NEW` for the given user. This call is idempotent: if an order with the same
    /// number exists (for any user), it is returned untouched as [`InsertOrderResult::AlreadyExists`].
    ///
    /// A balance record for the user is created if one does not exist yet.
    async fn insert_order(&self, user_id: i64, number: &OrderNumber) -> Result<InsertOrderResult, LedgerError>;

    async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, LedgerError>;

    /// All orders registered by the user, newest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError>;
}
