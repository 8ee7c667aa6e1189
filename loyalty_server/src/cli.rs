use std::{env, env::VarError};

/// Every variable the server reads, in the order the help text lists them.
const CONFIG_VARS: [&str; 10] = [
    "LPS_HOST",
    "LPS_PORT",
    "LPS_DATABASE_URL",
    "LPS_DB_MAX_CONNECTIONS",
    "LPS_ACCRUAL_URL",
    "LPS_POLL_INTERVAL",
    "LPS_ACCRUAL_TIMEOUT",
    "LPS_DEFAULT_RETRY_AFTER",
    "LPS_SHUTDOWN_TIMEOUT",
    "RUST_LOG",
];

/// The server is configured through the environment only. Any argument at all is taken as a request for help.
///
/// Returns `true` if help was printed, in which case the caller should exit.
pub fn handle_command_line_args() -> bool {
    let wants_help = env::args().nth(1).is_some();
    if wants_help {
        println!("\n{}\n", include_str!("./cli-help.txt"));
        println!("Current configuration:");
        env_report().iter().for_each(|line| println!("{line}"));
    }
    wants_help
}

fn env_report() -> Vec<String> {
    CONFIG_VARS
        .iter()
        .map(|&name| {
            let value = match env::var(name) {
                Ok(s) => s,
                Err(VarError::NotPresent) => "(default)".into(),
                Err(VarError::NotUnicode(s)) => format!("(not unicode: {})", s.to_string_lossy()),
            };
            format!("  {name:<25} {value}")
        })
        .collect()
}
