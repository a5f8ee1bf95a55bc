use crate::core::RetryPolicy;
use clap::Parser;
use std::time::Duration;

/// Serve atomic balance transfers over HTTP
#[derive(Parser, Debug)]
#[command(name = "transfer-engine")]
#[command(about = "Serve atomic balance transfers over HTTP", long_about = None)]
pub struct CliArgs {
    /// The port to serve the REST API from
    #[arg(
        short,
        long,
        default_value_t = 7000,
        help = "Port to serve the REST API from"
    )]
    pub port: u16,

    /// Conditional-commit attempts before a transfer fails with contention
    #[arg(
        long = "max-retries",
        value_name = "COUNT",
        help = "Commit attempts per transfer before giving up (default: 10)"
    )]
    pub max_retries: Option<u32>,

    /// Initial conflict backoff in milliseconds, doubling per lost commit
    #[arg(
        long = "backoff-ms",
        value_name = "MILLIS",
        help = "Initial conflict backoff in milliseconds (default: 1)"
    )]
    pub backoff_ms: Option<u64>,
}

impl CliArgs {
    /// Create a RetryPolicy from CLI arguments
    ///
    /// Unset arguments fall back to the policy defaults. `--max-retries 0`
    /// is raised to one attempt: a transfer that may never reach the store
    /// cannot succeed.
    pub fn to_retry_policy(&self) -> RetryPolicy {
        let default = RetryPolicy::default();

        RetryPolicy {
            max_attempts: self.max_retries.unwrap_or(default.max_attempts).max(1),
            initial_backoff: self
                .backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(default.initial_backoff),
            max_backoff: default.max_backoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::default_port(&["program"], 7000)]
    #[case::short_flag(&["program", "-p", "8080"], 8080)]
    #[case::long_flag(&["program", "--port", "9000"], 9000)]
    fn test_port_parsing(#[case] args: &[&str], #[case] expected: u16) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.port, expected);
    }

    #[rstest]
    #[case::all_defaults(&["program"], 10, Duration::from_millis(1))]
    #[case::custom_retries(&["program", "--max-retries", "3"], 3, Duration::from_millis(1))]
    #[case::zero_retries_raised_to_one(&["program", "--max-retries", "0"], 1, Duration::from_millis(1))]
    #[case::custom_backoff(&["program", "--backoff-ms", "5"], 10, Duration::from_millis(5))]
    #[case::all_custom(
        &["program", "--max-retries", "3", "--backoff-ms", "5"],
        3,
        Duration::from_millis(5)
    )]
    fn test_retry_policy_conversion(
        #[case] args: &[&str],
        #[case] expected_attempts: u32,
        #[case] expected_backoff: Duration,
    ) {
        let policy = CliArgs::try_parse_from(args).unwrap().to_retry_policy();

        assert_eq!(policy.max_attempts, expected_attempts);
        assert_eq!(policy.initial_backoff, expected_backoff);
    }

    #[rstest]
    #[case::bad_port(&["program", "--port", "not-a-port"])]
    #[case::bad_retries(&["program", "--max-retries", "-1"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
