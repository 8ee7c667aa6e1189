//! Loyalty Engine
//!
//! The loyalty engine keeps track of the points that users earn on their orders and spend on new ones. This library
//! contains the core logic of the loyalty points server. It has no HTTP surface of its own.
//!
//! The library is divided into these main sections:
//! 1. The ledger store ([`traits`] and the SQLite backend, [`SqliteDatabase`]). It persists orders, balances and
//!    withdrawals, and guarantees that a balance can never go negative and that an order is credited at most once.
//! 2. The accrual gateway ([`mod@accrual`]). This asks the external accrual authority how many points an order is worth.
//! 3. The reconciliation worker ([`mod@reconciliation`]). It ties the two together: it polls the accrual authority for
//!    every pending order and writes the verdicts to the ledger.
//! 4. The public API ([`OrderApi`] and [`BalanceApi`]), used by the HTTP handlers to register orders and spend points.
pub mod accrual;
pub mod db_types;
pub mod helpers;
mod ledger_api;
pub mod reconciliation;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

pub use accrual::{AccrualClient, AccrualConfig, AccrualGateway, GatewayError, Verdict};
pub use ledger_api::{
    balance_api::BalanceApi,
    errors::OrderApiError,
    order_api::{OrderApi, RegisterOrderResult},
};
pub use reconciliation::{CycleReport, ReconciliationWorker, WorkerConfig};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
