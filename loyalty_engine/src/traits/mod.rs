//! # Ledger store interfaces
//!
//! This module defines the behaviour that a storage backend must expose to be used by the loyalty engine. Rather than
//! one monolithic interface, each collaborator gets a trait with exactly the operations it needs:
//!
//! * [`PendingOrders`] and [`OrderCrediting`] are used by the reconciliation worker, and by nothing else. The worker
//!   is the only writer of order statuses and balance credits.
//! * [`BalanceManagement`] reads balances and debits them for withdrawals. It is used by the withdrawal handlers.
//! * [`OrderManagement`] registers orders and looks them up for the order handlers.
//!
//! Balance credits and debits both take the write lock on the user's balance, so the two writers never interleave.
mod balance_management;
mod data_objects;
mod order_management;
mod reconciliation;

pub use balance_management::{BalanceManagement, WithdrawalError};
pub use data_objects::{CreditOutcome, InsertOrderResult};
pub use order_management::OrderManagement;
pub use reconciliation::{LedgerError, OrderCrediting, PendingOrders};
