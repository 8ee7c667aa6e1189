pub mod luhn;

pub use luhn::{validate_order_number, OrderNumberError};
