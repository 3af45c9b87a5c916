use std::time::Duration;

pub use webpump_common::limits::DEFAULT_INTERVAL_MS;
use webpump_common::ConfigError;

/// A validated, strictly positive tick period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PollInterval(Duration);

impl PollInterval {
    /// Validate a period given in milliseconds. Zero and negative values
    /// are rejected with [`ConfigError::InvalidInterval`].
    pub fn from_millis(ms: i64) -> Result<Self, ConfigError> {
        if ms <= 0 {
            return Err(ConfigError::InvalidInterval(ms));
        }
        Ok(Self(Duration::from_millis(ms.unsigned_abs())))
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }

    pub fn as_millis(self) -> u128 {
        self.0.as_millis()
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self(Duration::from_millis(DEFAULT_INTERVAL_MS.unsigned_abs()))
    }
}

impl TryFrom<i64> for PollInterval {
    type Error = ConfigError;

    fn try_from(ms: i64) -> Result<Self, Self::Error> {
        Self::from_millis(ms)
    }
}
