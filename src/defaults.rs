//! Default configuration constants for routedrill.
//!
//! Shared between the config layer and the engine types so both agree on
//! the same starting values.

/// Minimum confidence a record must exceed to be reported by single-query search.
pub const SEARCH_FLOOR: f64 = 60.0;

/// Maximum number of results returned by single-query search.
pub const MAX_SEARCH_RESULTS: usize = 5;

/// Review intervals in days, indexed by the review stage before it is incremented.
///
/// 0.5 days = 12 hours. Stages past the end of the table reuse the last entry.
pub const REVIEW_INTERVALS_DAYS: [f64; 6] = [0.5, 1.0, 3.0, 7.0, 15.0, 30.0];

/// Consecutive correct answers needed to leave the mistake pool.
pub const MISTAKE_GRADUATION_STREAK: u32 = 5;

/// Default number of questions in a random quiz session.
pub const QUIZ_COUNT: usize = 50;

/// Number of options on every quiz question.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// Prefix for synthetic quiz options used when too few real zones exist.
pub const PLACEHOLDER_ZONE_PREFIX: &str = "未知区域";

/// Milliseconds in one day.
pub const DAY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Environment variable overriding the record store path.
pub const ENV_STORE_PATH: &str = "ROUTEDRILL_STORE";

/// Environment variable overriding the quiz session size.
pub const ENV_QUIZ_COUNT: &str = "ROUTEDRILL_QUIZ_COUNT";

/// Current wall-clock time as epoch milliseconds.
///
/// Engine functions take `now` explicitly; this is only called at the edges.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
