//! Environment-driven configuration for entity behaviour.
//!
//! Deployments differ in how seqrun identifiers are assigned; everything else
//! about the entity model is fixed.

use std::fmt;
use std::str::FromStr;

use mockable::Env;

/// Environment variable selecting the seqrun identifier policy.
pub const SEQRUN_ID_POLICY_ENV: &str = "SEQRUN_ID_POLICY";
const SEQRUN_ID_POLICY_EXPECTED: &str = "position|runid";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
}

/// How a seqrun obtains its `seqrunid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeqRunIdPolicy {
    /// Auto-assigned: one past the highest position in the libprep.
    #[default]
    Position,
    /// Client-supplied external run identifier, unique within the libprep.
    RunId,
}

impl FromStr for SeqRunIdPolicy {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "position" => Ok(Self::Position),
            "runid" | "run_id" => Ok(Self::RunId),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SeqRunIdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => f.write_str("position"),
            Self::RunId => f.write_str("runid"),
        }
    }
}

/// Entity configuration threaded through every request context.
///
/// # Examples
/// ```
/// use seqtrack::domain::{EntityConfig, SeqRunIdPolicy};
///
/// let config = EntityConfig::default();
/// assert_eq!(config.seqrun_id_policy(), SeqRunIdPolicy::Position);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityConfig {
    seqrun_id_policy: SeqRunIdPolicy,
}

impl EntityConfig {
    /// Configuration with an explicit seqrun identifier policy.
    #[must_use]
    pub const fn with_seqrun_id_policy(seqrun_id_policy: SeqRunIdPolicy) -> Self {
        Self { seqrun_id_policy }
    }

    /// Read configuration from the supplied environment.
    ///
    /// An unset `SEQRUN_ID_POLICY` selects [`SeqRunIdPolicy::Position`].
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let seqrun_id_policy = env
            .string(SEQRUN_ID_POLICY_ENV)
            .map(|raw| {
                raw.parse().map_err(|()| ConfigError::InvalidEnv {
                    name: SEQRUN_ID_POLICY_ENV,
                    value: raw,
                    expected: SEQRUN_ID_POLICY_EXPECTED,
                })
            })
            .transpose()?
            .unwrap_or_default();
        Ok(Self { seqrun_id_policy })
    }

    /// Active seqrun identifier policy.
    #[must_use]
    pub const fn seqrun_id_policy(&self) -> SeqRunIdPolicy {
        self.seqrun_id_policy
    }
}
