//! Exchange configuration and timeouts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long a send or receive may wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Complete only if the operation can finish without waiting
    NonBlocking,
    /// Wait until done or interrupted
    #[default]
    Infinite,
    /// Wait at most this long
    After(Duration),
    /// Keep whatever timeout the exchange last used
    Unchanged,
}

impl Timeout {
    /// Timeout from a millisecond count: 0 is non-blocking, negative waits
    /// forever.
    pub fn from_millis(millis: i64) -> Self {
        match millis {
            0 => Self::NonBlocking,
            millis if millis < 0 => Self::Infinite,
            millis => Self::After(Duration::from_millis(millis.unsigned_abs())),
        }
    }

    /// Millisecond form accepted by [`Timeout::from_millis`]; `None` for
    /// [`Timeout::Unchanged`].
    pub fn as_millis(self) -> Option<i64> {
        match self {
            Self::NonBlocking => Some(0),
            Self::Infinite => Some(-1),
            Self::After(duration) => {
                Some(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX).max(1))
            },
            Self::Unchanged => None,
        }
    }

    /// `self`, or `current` if `self` is [`Timeout::Unchanged`].
    #[must_use]
    pub fn or(self, current: Self) -> Self {
        match self {
            Self::Unchanged => current,
            explicit => explicit,
        }
    }
}

/// Settings for a [`crate::Exchange`].
///
/// Deserializes from a configuration file with every field optional:
///
/// ```
/// # use qkd_core::{ExchangeConfig, Timeout};
/// # use std::time::Duration;
/// let config: ExchangeConfig = serde_json::from_str(r#"{"default_timeout_ms": 250}"#).unwrap();
/// assert_eq!(config.default_timeout, Timeout::After(Duration::from_millis(250)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Timeout applied until a call passes an explicit one
    #[serde(rename = "default_timeout_ms", with = "timeout_millis")]
    pub default_timeout: Timeout,

    /// Largest payload sent or accepted, in bytes
    pub max_payload_size: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self { default_timeout: Timeout::Infinite, max_payload_size: qkd_proto::MAX_PAYLOAD_SIZE }
    }
}

mod timeout_millis {
    use serde::{Deserialize, Deserializer, Serializer, ser::Error};

    use super::Timeout;

    pub fn serialize<S: Serializer>(timeout: &Timeout, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = timeout
            .as_millis()
            .ok_or_else(|| S::Error::custom("`Unchanged` is not a configurable timeout"))?;
        serializer.serialize_i64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timeout, D::Error> {
        i64::deserialize(deserializer).map(Timeout::from_millis)
    }
}
