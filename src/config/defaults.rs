//! Default configuration values

/// Interval between two polling rounds (in milliseconds)
pub const POLL_INTERVAL_MS: u64 = 3_000;

/// Per-request HTTP timeout (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Number of builds fetched concurrently within one polling round
pub const POLL_CONCURRENCY: usize = 1;

/// Fast retry profile: minimum wait between attempts (in milliseconds)
pub const FAST_RETRY_WAIT_MIN_MS: u64 = 100;

/// Fast retry profile: maximum wait between attempts (in milliseconds)
pub const FAST_RETRY_WAIT_MAX_MS: u64 = 400;

/// Fast retry profile: total attempts per request
pub const FAST_RETRY_ATTEMPTS: u32 = 4;

/// Slow retry profile: minimum wait between attempts (in milliseconds)
pub const SLOW_RETRY_WAIT_MIN_MS: u64 = 10_000;

/// Slow retry profile: maximum wait between attempts (in milliseconds)
pub const SLOW_RETRY_WAIT_MAX_MS: u64 = 60_000;

/// Slow retry profile: total attempts per request
pub const SLOW_RETRY_ATTEMPTS: u32 = 6;

/// Environment key carrying the router build number into every child build
pub const SOURCE_BUILD_NUMBER_KEY: &str = "SOURCE_BITRISE_BUILD_NUMBER";

/// Environment key under which the started build slugs are exported
pub const STARTED_BUILDS_KEY: &str = "ROUTER_STARTED_BUILDS";

/// Hook type sent with every start request
pub const HOOK_TYPE: &str = "bitrise";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
