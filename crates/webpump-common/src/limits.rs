//! Bounds shared by the poll bridge and its configuration.

/// Tick period used when nothing else is chosen, in milliseconds.
pub const DEFAULT_INTERVAL_MS: i64 = 1;

/// Longest tick period a config file or the command line may request.
pub const MAX_INTERVAL_MS: i64 = 1000;
