//! Check-digit validation for order numbers.
//!
//! Both registered orders and withdrawal order numbers must pass the Luhn (mod 10) check. The number is treated as a
//! string of ASCII digits, so arbitrarily long numbers are supported and leading zeroes are significant.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    #[error("The order number is empty")]
    Empty,
    #[error("The order number '{0}' contains non-digit characters")]
    NotNumeric(String),
    #[error("The order number '{0}' failed the check-digit test")]
    InvalidChecksum(String),
}

pub fn validate_order_number(number: &str) -> Result<(), OrderNumberError> {
    if number.is_empty() {
        return Err(OrderNumberError::Empty);
    }
    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OrderNumberError::NotNumeric(number.to_string()));
    }
    if luhn_checksum(number) % 10 != 0 {
        return Err(OrderNumberError::InvalidChecksum(number.to_string()));
    }
    Ok(())
}

/// Sums the digits from the right, doubling every second one. Assumes `digits` is all ASCII digits.
fn luhn_checksum(digits: &str) -> u32 {
    digits
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, d)| match (i % 2 == 1, d * 2) {
            (true, doubled) if doubled > 9 => doubled - 9,
            (true, doubled) => doubled,
            (false, _) => d,
        })
        .sum()
}
