//! # Loyalty points server
//! This crate hosts the HTTP front end of the loyalty points system. It is responsible for:
//! * Accepting order numbers from users and storing them for accrual.
//! * Reporting orders, balances and withdrawals back to their owners.
//! * Debiting balances when users spend their points.
//! * Running the reconciliation worker, which asks the accrual authority about pending orders and credits balances.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/user/orders`: `POST` registers an order, `GET` lists the caller's orders.
//! * `/api/user/balance`: The caller's current and withdrawn points.
//! * `/api/user/balance/withdraw`: Spends points on an order.
//! * `/api/user/withdrawals`: The caller's withdrawal history.
//!
//! Every `/api/user` route identifies the caller from the `X-Loyalty-User-Id` header.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod reconciliation_worker;
pub mod routes;
pub mod server;
