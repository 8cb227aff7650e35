use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PricingError;

// Baseline pricing parameters
pub const DEFAULT_SPOT: f64 = 100.0;
pub const DEFAULT_RATE: f64 = 0.02;
pub const DEFAULT_VOL: f64 = 0.2;
pub const DEFAULT_STRIKE: f64 = 100.0;
pub const DEFAULT_MATURITY: f64 = 1.0; // years
pub const DEFAULT_PATHS: usize = 100_000;
pub const DEFAULT_SEED: u64 = 42;

/// Two-sided 95% normal quantile used for every confidence interval.
pub const CONFIDENCE_Z: f64 = 1.96;

/// Environment variable naming a shared library that exports the kernel ABI.
pub const NATIVE_LIB_ENV: &str = "MCENGINE_NATIVE_LIB";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub n_paths: usize,
    /// `None` draws fresh entropy for every pricing call.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            n_paths: DEFAULT_PATHS,
            seed: Some(DEFAULT_SEED),
        }
    }
}

impl RunConfig {
    pub fn new(n_paths: usize, seed: Option<u64>) -> Self {
        Self { n_paths, seed }
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        if self.n_paths < 1 {
            return Err(PricingError::InvalidConfiguration(format!(
                "n_paths must be >= 1, got {}",
                self.n_paths
            )));
        }
        Ok(())
    }

    /// Seed for this call: the configured one, or a fresh entropy draw.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Reference,
    Accelerated,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Reference => f.write_str("reference"),
            BackendKind::Accelerated => f.write_str("accelerated"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reference" | "ref" => Ok(BackendKind::Reference),
            "accelerated" | "native" => Ok(BackendKind::Accelerated),
            other => Err(format!(
                "unknown backend `{other}` (expected `reference` or `accelerated`)"
            )),
        }
    }
}

/// A family of runs that differ only by seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSweep {
    pub seed_start: u64,
    pub seed_stride: u64,
    pub n_runs: u32,
}

impl Default for SeedSweep {
    fn default() -> Self {
        Self {
            seed_start: 0,
            seed_stride: 1,
            n_runs: 200,
        }
    }
}

impl SeedSweep {
    pub fn seed(&self, run: u32) -> u64 {
        self.seed_start
            .wrapping_add(self.seed_stride.wrapping_mul(run as u64))
    }

    pub fn apply(&self, base: &RunConfig, run: u32) -> RunConfig {
        RunConfig {
            seed: Some(self.seed(run)),
            ..base.clone()
        }
    }

    pub fn generate_configs(&self, base: &RunConfig) -> Vec<RunConfig> {
        (0..self.n_runs).map(|i| self.apply(base, i)).collect()
    }
}
