//! Pipeline configuration, resolved once at startup.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{CallbackError, CallbackResult};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;
pub const DEFAULT_MAX_CONCURRENT: usize = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Retry settings for a single listener delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound on one HTTP attempt.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallbackConfig {
    /// Capacity of the notification channel.
    pub channel_capacity: usize,
    /// In-flight deliveries allowed per notification.
    pub max_concurrent: usize,
    pub retry: RetryPolicy,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            retry: RetryPolicy::default(),
        }
    }
}

impl CallbackConfig {
    /// Validate a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::InvalidConfig`] if a count is zero or the base delay is
    /// larger than the cap.
    pub fn new(
        channel_capacity: usize,
        max_concurrent: usize,
        retry: RetryPolicy,
    ) -> CallbackResult<Self> {
        if channel_capacity == 0 {
            return Err(CallbackError::InvalidConfig(
                "channel capacity must be at least 1".into(),
            ));
        }
        if max_concurrent == 0 {
            return Err(CallbackError::InvalidConfig(
                "max concurrent deliveries must be at least 1".into(),
            ));
        }
        if retry.max_attempts == 0 {
            return Err(CallbackError::InvalidConfig(
                "max attempts must be at least 1".into(),
            ));
        }
        if retry.base_delay > retry.max_delay {
            return Err(CallbackError::InvalidConfig(
                "base delay cannot exceed max delay".into(),
            ));
        }

        Ok(Self {
            channel_capacity,
            max_concurrent,
            retry,
        })
    }

    /// Build the configuration from `CALLBACK_*` environment values.
    ///
    /// `lookup` returns the raw value for a variable name, or `None` when it is unset.
    /// Missing or blank values take the defaults.
    pub fn from_env_values(lookup: impl Fn(&str) -> Option<String>) -> CallbackResult<Self> {
        let retry = RetryPolicy {
            max_attempts: parse_env_value(
                "CALLBACK_MAX_ATTEMPTS",
                lookup("CALLBACK_MAX_ATTEMPTS"),
                DEFAULT_MAX_ATTEMPTS,
            )?,
            base_delay: millis_from_env_value(
                "CALLBACK_BASE_DELAY_MS",
                lookup("CALLBACK_BASE_DELAY_MS"),
                DEFAULT_BASE_DELAY,
            )?,
            max_delay: millis_from_env_value(
                "CALLBACK_MAX_DELAY_MS",
                lookup("CALLBACK_MAX_DELAY_MS"),
                DEFAULT_MAX_DELAY,
            )?,
            request_timeout: millis_from_env_value(
                "CALLBACK_REQUEST_TIMEOUT_MS",
                lookup("CALLBACK_REQUEST_TIMEOUT_MS"),
                DEFAULT_REQUEST_TIMEOUT,
            )?,
        };

        Self::new(
            parse_env_value(
                "CALLBACK_CHANNEL_CAPACITY",
                lookup("CALLBACK_CHANNEL_CAPACITY"),
                DEFAULT_CHANNEL_CAPACITY,
            )?,
            parse_env_value(
                "CALLBACK_MAX_CONCURRENT",
                lookup("CALLBACK_MAX_CONCURRENT"),
                DEFAULT_MAX_CONCURRENT,
            )?,
            retry,
        )
    }
}

/// Parse a numeric environment value, falling back to `default` when it is unset or blank.
pub fn parse_env_value<T: FromStr>(
    name: &str,
    value: Option<String>,
    default: T,
) -> CallbackResult<T> {
    let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    value
        .parse()
        .map_err(|_| CallbackError::InvalidConfig(format!("{name} is not a valid number: {value}")))
}

fn millis_from_env_value(
    name: &str,
    value: Option<String>,
    default: Duration,
) -> CallbackResult<Duration> {
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parse_env_value(name, value, default_ms).map(Duration::from_millis)
}
