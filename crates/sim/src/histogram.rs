use mcengine_shared::PricingError;
use serde::Serialize;

pub const DEFAULT_BINS: usize = 100;

/// Equal-width histogram over `[lower, upper]`. The top edge is inclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    lower: f64,
    upper: f64,
    counts: Vec<u64>,
}

impl Histogram {
    pub fn build(samples: &[f64], n_bins: usize) -> Result<Self, PricingError> {
        if n_bins == 0 {
            return Err(PricingError::InvalidConfiguration(
                "histogram needs at least one bin".to_string(),
            ));
        }
        if samples.is_empty() {
            return Err(PricingError::InvalidConfiguration(
                "histogram needs at least one sample".to_string(),
            ));
        }
        if samples.iter().any(|x| !x.is_finite()) {
            return Err(PricingError::NumericDegenerate(
                "non-finite sample in histogram input".to_string(),
            ));
        }

        let lower = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let upper = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // All samples equal: a single bin holds everything.
        if upper == lower {
            return Ok(Self {
                lower,
                upper,
                counts: vec![samples.len() as u64],
            });
        }

        let width = (upper - lower) / n_bins as f64;
        let mut counts = vec![0u64; n_bins];
        for &x in samples {
            let idx = (((x - lower) / width) as usize).min(n_bins - 1);
            counts[idx] += 1;
        }
        Ok(Self {
            lower,
            upper,
            counts,
        })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn bin_width(&self) -> f64 {
        (self.upper - self.lower) / self.counts.len() as f64
    }

    pub fn centres(&self) -> Vec<f64> {
        let w = self.bin_width();
        (0..self.counts.len())
            .map(|i| self.lower + (i as f64 + 0.5) * w)
            .collect()
    }
}
