use std::time::Duration;

/// Parses a whole, non-negative number of seconds, e.g. from an environment variable or an HTTP header.
///
/// Zero is accepted only when `allow_zero` is set; intervals and timeouts of zero seconds are usually a mistake.
pub fn parse_seconds(value: &str, allow_zero: bool) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) if !allow_zero => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => None,
    }
}
