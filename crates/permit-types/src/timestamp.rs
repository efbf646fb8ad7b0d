//! Unix timestamps and clocks for permit deadlines and blockhash expiry.
//!
//! EIP-712 permit messages carry whole-second Unix timestamps (`deadline`,
//! `sigDeadline`, `expiration`). The Solana backend reports blockhash expiry in
//! milliseconds. Both are derived from a [`Clock`], so tests can pin the
//! current time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::time::SystemTime;

use crate::error::ValidationError;

/// A Unix timestamp in whole seconds since the Unix epoch.
///
/// Serialized as a stringified integer, matching how `uint256` message fields
/// are sent to wallets.
///
/// ```
/// use permit_types::timestamp::UnixTimestamp;
///
/// let deadline = UnixTimestamp::from_secs(1_700_000_000) + 3600;
/// assert_eq!(deadline.as_secs(), 1_700_003_600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct UnixTimestamp(u64);

impl Serialize for UnixTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for UnixTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let ts = s
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom("timestamp must be a non-negative integer"))?;
        Ok(UnixTimestamp(ts))
    }
}

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<u64> for UnixTimestamp {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        UnixTimestamp(self.0.saturating_add(rhs))
    }
}

impl UnixTimestamp {
    /// Creates a new [`UnixTimestamp`] from a raw seconds value.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Truncates a millisecond timestamp to whole seconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis / 1000)
    }

    /// Returns the timestamp as raw seconds since the Unix epoch.
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Adds whole minutes, failing instead of saturating.
    pub fn plus_minutes(self, minutes: u64) -> Result<Self, ValidationError> {
        self.checked_offset(minutes, 60, "minutes")
    }

    /// Adds whole days, failing instead of saturating.
    pub fn plus_days(self, days: u64) -> Result<Self, ValidationError> {
        self.checked_offset(days, 86_400, "days")
    }

    fn checked_offset(
        self,
        amount: u64,
        unit_secs: u64,
        unit: &'static str,
    ) -> Result<Self, ValidationError> {
        amount
            .checked_mul(unit_secs)
            .and_then(|secs| self.0.checked_add(secs))
            .map(UnixTimestamp)
            .ok_or(ValidationError::TimestampOverflow { amount, unit })
    }
}

/// Source of the current time.
///
/// Signing flows take a `&dyn Clock` (or a generic `C: Clock`) instead of
/// reading the system time directly.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;

    /// Current time in whole seconds.
    fn now(&self) -> UnixTimestamp {
        UnixTimestamp::from_millis(self.now_millis())
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// A clock frozen at a fixed millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}
