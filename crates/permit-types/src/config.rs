//! Signing defaults for the permit pipelines.
//!
//! [`SigningConfig`] carries the offsets and freshness buffers the signing
//! flows apply when a caller does not pass explicit values. It is plain JSON:
//!
//! ```json
//! {
//!   "permit_deadline_minutes": 60,
//!   "permit2_expiration_days": 30,
//!   "permit2_address": "$PERMIT2_ADDRESS"
//! }
//! ```
//!
//! Every field is optional. String-typed values may reference environment
//! variables through [`LiteralOrEnv`].

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming a JSON config file for [`SigningConfig::load`].
pub const CONFIG_PATH_ENV: &str = "PERMIT_SIGNER_CONFIG";

/// Defaults applied by the signing flows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SigningConfig {
    /// EIP-2612 `deadline` offset from now, in minutes.
    #[serde(default = "config_defaults::permit_deadline_minutes")]
    pub permit_deadline_minutes: u64,
    /// Permit2 `sigDeadline` offset from now, in minutes.
    #[serde(default = "config_defaults::permit2_sig_deadline_minutes")]
    pub permit2_sig_deadline_minutes: u64,
    /// Permit2 allowance `expiration` offset from now, in days.
    #[serde(default = "config_defaults::permit2_expiration_days")]
    pub permit2_expiration_days: u64,
    /// How long a Permit2 allowance must still be valid to count as sufficient, in seconds.
    #[serde(default = "config_defaults::permit2_allowance_buffer_secs")]
    pub permit2_allowance_buffer_secs: u64,
    /// How long an EIP-2612 permit must still be valid to count as usable, in seconds.
    #[serde(default = "config_defaults::permit_validity_buffer_secs")]
    pub permit_validity_buffer_secs: u64,
    /// How long a Solana blockhash must still be valid before signing, in milliseconds.
    #[serde(default = "config_defaults::blockhash_buffer_ms")]
    pub blockhash_buffer_ms: u64,
    /// EIP-712 domain version used when a token has no `version()` getter.
    #[serde(default = "config_defaults::default_domain_version")]
    pub default_domain_version: String,
    /// Permit2 deployment to use instead of the canonical address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit2_address: Option<LiteralOrEnv<Address>>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            permit_deadline_minutes: config_defaults::permit_deadline_minutes(),
            permit2_sig_deadline_minutes: config_defaults::permit2_sig_deadline_minutes(),
            permit2_expiration_days: config_defaults::permit2_expiration_days(),
            permit2_allowance_buffer_secs: config_defaults::permit2_allowance_buffer_secs(),
            permit_validity_buffer_secs: config_defaults::permit_validity_buffer_secs(),
            blockhash_buffer_ms: config_defaults::blockhash_buffer_ms(),
            default_domain_version: config_defaults::default_domain_version(),
            permit2_address: None,
        }
    }
}

/// Error returned while loading a [`SigningConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SigningConfig {
    /// Reads a JSON config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `.env` if present, then the file named by [`CONFIG_PATH_ENV`].
    ///
    /// Falls back to [`SigningConfig::default`] when the variable is unset.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                tracing::debug!(%path, "Loading signing config");
                Self::from_path(path)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    /// The configured Permit2 address override, if any.
    pub fn permit2_address(&self) -> Option<Address> {
        self.permit2_address.as_ref().map(|a| *a.inner())
    }
}

mod config_defaults {
    pub fn permit_deadline_minutes() -> u64 {
        60
    }

    pub fn permit2_sig_deadline_minutes() -> u64 {
        30
    }

    pub fn permit2_expiration_days() -> u64 {
        30
    }

    pub fn permit2_allowance_buffer_secs() -> u64 {
        1800
    }

    pub fn permit_validity_buffer_secs() -> u64 {
        60
    }

    pub fn blockhash_buffer_ms() -> u64 {
        10_000
    }

    pub fn default_domain_version() -> String {
        "1".to_string()
    }
}

// ============================================================================
// Environment Variable Resolution
// ============================================================================

/// A transparent wrapper that resolves environment variables during deserialization.
///
/// Supports both literal values and environment variable references:
/// - Literal: `"0x000000000022D473030F116dDEE9F6B43aC78BA3"`
/// - Simple env var: `"$PERMIT2_ADDRESS"`
/// - Braced env var: `"${PERMIT2_ADDRESS}"`
///
/// The wrapper implements `Deref` to provide transparent access to the inner type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    pub fn from_literal(value: T) -> Self {
        Self(value)
    }

    /// Get a reference to the inner value
    pub fn inner(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Returns the variable name if the string matches `$VAR` or `${VAR}` syntax.
    fn parse_env_var_syntax(s: &str) -> Option<&str> {
        if let Some(braced) = s.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
            Some(braced)
        } else if let Some(var_name) = s.strip_prefix('$') {
            let valid = !var_name.is_empty()
                && var_name.chars().all(|c| c.is_alphanumeric() || c == '_');
            valid.then_some(var_name)
        } else {
            None
        }
    }
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for LiteralOrEnv<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let value = match Self::parse_env_var_syntax(&s) {
            Some(var_name) => std::env::var(var_name).map_err(|_| {
                serde::de::Error::custom(format!(
                    "Environment variable '{var_name}' not found (referenced as '{s}')"
                ))
            })?,
            None => s,
        };

        let parsed = value
            .parse::<T>()
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse value: {e}")))?;

        Ok(LiteralOrEnv(parsed))
    }
}

impl<T> Serialize for LiteralOrEnv<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}
