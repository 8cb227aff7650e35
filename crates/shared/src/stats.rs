use serde::{Deserialize, Serialize};

/// Streaming mean/variance accumulator (Welford), mergeable across workers
/// with the Chan et al. pairwise update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slice(values: &[f64]) -> Self {
        let mut stats = Self::new();
        for &x in values {
            stats.push(x);
        }
        stats
    }

    #[inline]
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;
        self.mean += delta * (n_b / n);
        self.m2 += other.m2 + delta * delta * (n_a * n_b / n);
        self.count += other.count;
    }

    pub fn merged(mut self, other: RunningStats) -> Self {
        self.merge(&other);
        self
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased (n − 1) sample variance; zero with fewer than two samples.
    pub fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            // Clamp rounding below zero, but let NaN through.
            let v = self.m2 / (self.count - 1) as f64;
            if v < 0.0 {
                0.0
            } else {
                v
            }
        }
    }

    pub fn sample_std(&self) -> f64 {
        self.sample_variance().sqrt()
    }

    /// Standard error of the mean.
    pub fn std_error(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.sample_std() / (self.count as f64).sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    fn two_pass(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var)
    }

    #[test]
    fn test_matches_two_pass() {
        let mut rng = Pcg64::seed_from_u64(5);
        let values: Vec<f64> = (0..10_000).map(|_| rng.gen_range(0.0..50.0)).collect();
        let stats = RunningStats::from_slice(&values);
        let (mean, var) = two_pass(&values);
        assert_eq!(stats.count(), 10_000);
        assert_relative_eq!(stats.mean(), mean, max_relative = 1e-12);
        assert_relative_eq!(stats.sample_variance(), var, max_relative = 1e-10);
        assert_relative_eq!(stats.std_error(), (var / 10_000.0).sqrt(), max_relative = 1e-10);
    }

    #[test]
    fn test_merge_matches_sequential() {
        let mut rng = Pcg64::seed_from_u64(11);
        let values: Vec<f64> = (0..9_999).map(|_| rng.gen_range(-3.0..7.0)).collect();
        let whole = RunningStats::from_slice(&values);
        let merged = values
            .chunks(1_000)
            .map(RunningStats::from_slice)
            .fold(RunningStats::new(), RunningStats::merged);
        assert_eq!(merged.count(), whole.count());
        assert_relative_eq!(merged.mean(), whole.mean(), max_relative = 1e-12);
        assert_relative_eq!(merged.sample_variance(), whole.sample_variance(), max_relative = 1e-10);
    }

    #[test]
    fn test_constant_samples_are_exact() {
        let stats = RunningStats::from_slice(&[4.25; 1_000]);
        assert_eq!(stats.mean(), 4.25);
        assert_eq!(stats.sample_variance(), 0.0);
        let merged = stats.merged(RunningStats::from_slice(&[4.25; 17]));
        assert_eq!(merged.mean(), 4.25);
        assert_eq!(merged.std_error(), 0.0);
    }

    #[test]
    fn test_nan_sample_propagates() {
        let stats = RunningStats::from_slice(&[1.0, f64::NAN, 2.0]);
        assert!(stats.mean().is_nan());
        assert!(stats.sample_variance().is_nan());
        assert!(stats.std_error().is_nan());
    }

    #[test]
    fn test_single_sample_has_zero_error() {
        let stats = RunningStats::from_slice(&[3.0]);
        assert_eq!(stats.mean(), 3.0);
        assert_eq!(stats.sample_variance(), 0.0);
        assert_eq!(stats.std_error(), 0.0);
    }

    #[test]
    fn test_merge_with_empty() {
        let stats = RunningStats::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(stats.merged(RunningStats::new()), stats);
        assert_eq!(RunningStats::new().merged(stats), stats);
    }
}
