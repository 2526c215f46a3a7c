//! When local state follows a remote call: before it resolves, or after it succeeds.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    /// Apply locally at once; the remote result is only reported.
    Optimistic,
    /// Await the remote call and apply only on success.
    Confirmed,
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimistic => f.write_str("optimistic"),
            Self::Confirmed => f.write_str("confirmed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reconcile policy '{0}', expected 'optimistic' or 'confirmed'")]
pub struct UnknownPolicy(pub String);

impl FromStr for ReconcilePolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "optimistic" => Ok(Self::Optimistic),
            "confirmed" => Ok(Self::Confirmed),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// Reconciliation choice per remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPolicy {
    pub update: ReconcilePolicy,
    pub create: ReconcilePolicy,
    pub delete: ReconcilePolicy,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            update: ReconcilePolicy::Optimistic,
            create: ReconcilePolicy::Confirmed,
            delete: ReconcilePolicy::Optimistic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_confirms_only_creates() {
        let policy = SyncPolicy::default();
        assert_eq!(policy.update, ReconcilePolicy::Optimistic);
        assert_eq!(policy.delete, ReconcilePolicy::Optimistic);
        assert_eq!(policy.create, ReconcilePolicy::Confirmed);
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!(" Confirmed ".parse::<ReconcilePolicy>(), Ok(ReconcilePolicy::Confirmed));
        assert_eq!("optimistic".parse::<ReconcilePolicy>(), Ok(ReconcilePolicy::Optimistic));
        assert!("eager".parse::<ReconcilePolicy>().is_err());
    }
}
