use loyalty_common::Points;
use loyalty_engine::{
    db_types::{Balance, Order, OrderNumber, Withdrawal},
    traits::{BalanceManagement, InsertOrderResult, LedgerError, OrderManagement, WithdrawalError},
};
use mockall::mock;

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn insert_order(&self, user_id: i64, number: &OrderNumber) -> Result<InsertOrderResult, LedgerError>;
        async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, LedgerError>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError>;
    }
}

mock! {
    pub BalanceManager {}
    impl BalanceManagement for BalanceManager {
        async fn fetch_balance(&self, user_id: i64) -> Result<Balance, WithdrawalError>;
        async fn withdraw(&self, user_id: i64, order_number: &OrderNumber, sum: Points) -> Result<Withdrawal, WithdrawalError>;
        async fn fetch_withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, WithdrawalError>;
    }
}
