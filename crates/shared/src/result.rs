use serde::{Deserialize, Serialize};

use crate::config::CONFIDENCE_Z;
use crate::error::PricingError;
use crate::stats::RunningStats;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub price: f64,
    pub std_error: f64,
    pub confidence_interval_95: (f64, f64),
    pub n_paths: u64,
}

impl PricingResult {
    /// Builds a result from a price and its standard error using the
    /// large-sample `±1.96·SE` interval.
    pub fn new(price: f64, std_error: f64, n_paths: u64) -> Result<Self, PricingError> {
        if !price.is_finite() || !std_error.is_finite() {
            return Err(PricingError::NumericDegenerate(format!(
                "non-finite estimate (price={price}, std_error={std_error})"
            )));
        }
        let half = CONFIDENCE_Z * std_error;
        Ok(Self {
            price,
            std_error,
            confidence_interval_95: (price - half, price + half),
            n_paths,
        })
    }

    pub fn from_stats(stats: &RunningStats) -> Result<Self, PricingError> {
        Self::new(stats.mean(), stats.std_error(), stats.count())
    }

    pub fn half_width(&self) -> f64 {
        0.5 * (self.confidence_interval_95.1 - self.confidence_interval_95.0)
    }

    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = self.confidence_interval_95;
        lo <= value && value <= hi
    }
}

/// Results of repeated pricings of the same request under different seeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingBatch {
    pub seeds: Vec<u64>,
    pub results: Vec<PricingResult>,
}

impl PricingBatch {
    pub fn from_results(seeds: Vec<u64>, results: Vec<PricingResult>) -> Self {
        debug_assert_eq!(seeds.len(), results.len());
        Self { seeds, results }
    }

    pub fn n_runs(&self) -> usize {
        self.results.len()
    }

    pub fn mean_price(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.results.iter().map(|r| r.price).sum::<f64>() / self.results.len() as f64
        }
    }

    pub fn mean_std_error(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.results.iter().map(|r| r.std_error).sum::<f64>() / self.results.len() as f64
        }
    }

    /// Fraction of intervals that contain `target`.
    pub fn coverage(&self, target: f64) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        let hits = self.results.iter().filter(|r| r.contains(target)).count();
        hits as f64 / self.results.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_uses_fixed_z() {
        let r = PricingResult::new(10.0, 0.5, 1000).unwrap();
        assert_eq!(r.confidence_interval_95, (10.0 - 0.98, 10.0 + 0.98));
        assert!(r.contains(10.9));
        assert!(!r.contains(11.0));
        assert!((r.half_width() - 0.98).abs() < 1e-12);
    }

    #[test]
    fn test_zero_error_collapses_interval() {
        let r = PricingResult::from_stats(&RunningStats::from_slice(&[2.5])).unwrap();
        assert_eq!(r.confidence_interval_95, (2.5, 2.5));
        assert!(r.contains(2.5));
        assert_eq!(r.n_paths, 1);
    }

    #[test]
    fn test_non_finite_is_degenerate() {
        let err = PricingResult::new(f64::INFINITY, 0.0, 10).unwrap_err();
        assert!(matches!(err, PricingError::NumericDegenerate(_)));
        assert!(PricingResult::new(1.0, f64::NAN, 10).is_err());
    }

    #[test]
    fn test_batch_coverage() {
        let results = vec![
            PricingResult::new(9.0, 1.0, 10).unwrap(),
            PricingResult::new(10.0, 1.0, 10).unwrap(),
            PricingResult::new(20.0, 1.0, 10).unwrap(),
            PricingResult::new(11.0, 1.0, 10).unwrap(),
        ];
        let batch = PricingBatch::from_results(vec![0, 1, 2, 3], results);
        assert_eq!(batch.n_runs(), 4);
        assert_eq!(batch.coverage(10.0), 0.75);
        assert_eq!(batch.mean_price(), 12.5);
        assert_eq!(batch.mean_std_error(), 1.0);
    }
}
