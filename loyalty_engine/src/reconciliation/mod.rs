//! # Order reconciliation
//!
//! The reconciliation worker is the only writer of order statuses and balance credits. Every cycle it lists the orders
//! that are still `NEW` or `PROCESSING`, asks the accrual authority about each of them in turn, and applies every
//! usable verdict through [`crate::traits::OrderCrediting`].
//!
//! Nothing a cycle does is fatal. An order that cannot be resolved this time stays pending and is asked about again on
//! the next cycle.
mod worker;

pub use worker::{CycleReport, ReconciliationWorker, WorkerConfig};
