//! # Loyalty engine public API
//!
//! The `ledger_api` module exposes the programmatic API that the HTTP handlers use. Each API wraps a backend that
//! implements the matching trait from [`crate::traits`], and adds the input validation that the backend takes for
//! granted.
//!
//! * [`order_api`] registers orders on behalf of a user and lists them.
//! * [`balance_api`] reads balances and processes withdrawals.
//!
//! ```rust,ignore
//! use loyalty_engine::{OrderApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/loyalty_store.db", 5).await?;
//! let api = OrderApi::new(db);
//! let result = api.register_order(42, "79927398713").await?;
//! ```
pub mod balance_api;
pub mod errors;
pub mod order_api;
