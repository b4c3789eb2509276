//! Engine configuration.
//!
//! Defaults follow the institution's exam rules: at most four exams per day
//! and one exam per semester per day. Values can be loaded from TOML or
//! overridden from the environment.
//!
//! # Environment
//! | Variable | Field |
//! |----------|-------|
//! | `EXAM_DAILY_CAP` | `daily_cap` |
//! | `EXAM_SEMESTER_DAILY_CAP` | `semester_daily_cap` |
//! | `EXAM_MAX_BACKTRACKS` | `max_backtracks` |
//! | `EXAM_EXACT_CHAIN_LIMIT` | `exact_chain_limit` |

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Tunables for the scheduler and estimator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum exams on one date across all semesters.
    pub daily_cap: usize,
    /// Maximum exams of one semester on one date.
    pub semester_daily_cap: usize,
    /// Reassignments of already-placed courses before declaring infeasibility.
    pub max_backtracks: usize,
    /// Largest semester for which the estimator computes the exact
    /// minimum-span exam order (exponential in this value).
    pub exact_chain_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            daily_cap: 4,
            semester_daily_cap: 1,
            max_backtracks: 10_000,
            exact_chain_limit: 12,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `EXAM_*` environment variables.
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Result<Self> {
        let default = Self::default();
        let config = Self {
            daily_cap: env_or("EXAM_DAILY_CAP", default.daily_cap),
            semester_daily_cap: env_or("EXAM_SEMESTER_DAILY_CAP", default.semester_daily_cap),
            max_backtracks: env_or("EXAM_MAX_BACKTRACKS", default.max_backtracks),
            exact_chain_limit: env_or("EXAM_EXACT_CHAIN_LIMIT", default.exact_chain_limit),
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the daily cap.
    pub fn with_daily_cap(mut self, cap: usize) -> Self {
        self.daily_cap = cap;
        self
    }

    /// Sets the per-semester daily cap.
    pub fn with_semester_daily_cap(mut self, cap: usize) -> Self {
        self.semester_daily_cap = cap;
        self
    }

    /// Sets the backtracking budget.
    pub fn with_max_backtracks(mut self, budget: usize) -> Self {
        self.max_backtracks = budget;
        self
    }

    /// Rejects caps that would make every date unusable.
    pub fn validate(&self) -> Result<()> {
        if self.daily_cap == 0 {
            return Err(EngineError::Config("daily_cap must be at least 1".into()));
        }
        if self.semester_daily_cap == 0 {
            return Err(EngineError::Config(
                "semester_daily_cap must be at least 1".into(),
            ));
        }
        if self.exact_chain_limit > 20 {
            return Err(EngineError::Config(format!(
                "exact_chain_limit {} is too large (max 20)",
                self.exact_chain_limit
            )));
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
