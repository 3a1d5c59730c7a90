//! CLI command handlers
//!
//! - Argument parsing structures
//! - Command routing

pub mod args;
pub mod router;

pub use args::{AuthArgs, Cli, Commands};
pub use router::execute_command;

/// Log filter for the `-v` count.
pub fn get_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,hyper=debug,reqwest=debug", // -vvv shows everything including dependencies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_level() {
        assert_eq!(get_log_level(0), "info");
        assert_eq!(get_log_level(1), "debug");
        assert_eq!(get_log_level(2), "trace");
        assert!(get_log_level(5).starts_with("trace,"));
    }
}
