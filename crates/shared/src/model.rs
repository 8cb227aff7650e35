use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// Risk-neutral geometric Brownian motion, `dS = r S dt + σ S dW`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbmModel {
    spot: f64,
    rate: f64,
    vol: f64,
}

impl GbmModel {
    pub fn new(spot: f64, rate: f64, vol: f64) -> Result<Self, PricingError> {
        if !spot.is_finite() || spot <= 0.0 {
            return Err(PricingError::invalid_parameter(
                "spot",
                format!("must be finite and > 0, got {spot}"),
            ));
        }
        if !rate.is_finite() {
            return Err(PricingError::invalid_parameter(
                "rate",
                format!("must be finite, got {rate}"),
            ));
        }
        if !vol.is_finite() || vol < 0.0 {
            return Err(PricingError::invalid_parameter(
                "vol",
                format!("must be finite and >= 0, got {vol}"),
            ));
        }
        Ok(Self { spot, rate, vol })
    }

    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[inline]
    pub fn vol(&self) -> f64 {
        self.vol
    }

    #[inline]
    pub fn discount_factor(&self, maturity: f64) -> f64 {
        (-self.rate * maturity).exp()
    }

    /// Maps a standard normal draw to a terminal price at `maturity`.
    #[inline]
    pub fn terminal_price(&self, maturity: f64, z: f64) -> f64 {
        let drift = (self.rate - 0.5 * self.vol * self.vol) * maturity;
        let diffusion = self.vol * maturity.sqrt();
        self.spot * (drift + diffusion * z).exp()
    }

    /// Draws `n_paths` terminal prices from the log-normal law of `S_T`.
    ///
    /// With `maturity == 0` every path is exactly `spot` and `rng` is left
    /// untouched.
    pub fn simulate_terminal<R: Rng + ?Sized>(
        &self,
        maturity: f64,
        n_paths: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>, PricingError> {
        if !maturity.is_finite() || maturity < 0.0 {
            return Err(PricingError::invalid_parameter(
                "maturity",
                format!("must be finite and >= 0, got {maturity}"),
            ));
        }
        if n_paths < 1 {
            return Err(PricingError::InvalidConfiguration(
                "n_paths must be >= 1".to_string(),
            ));
        }
        if maturity == 0.0 {
            return Ok(vec![self.spot; n_paths]);
        }

        let drift = (self.rate - 0.5 * self.vol * self.vol) * maturity;
        let diffusion = self.vol * maturity.sqrt();
        Ok((0..n_paths)
            .map(|_| {
                let z: f64 = rng.sample(StandardNormal);
                self.spot * (drift + diffusion * z).exp()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(GbmModel::new(0.0, 0.02, 0.2).is_err());
        assert!(GbmModel::new(-1.0, 0.02, 0.2).is_err());
        assert!(GbmModel::new(100.0, 0.02, -0.2).is_err());
        assert!(GbmModel::new(f64::NAN, 0.02, 0.2).is_err());
        assert!(GbmModel::new(100.0, f64::INFINITY, 0.2).is_err());
        // Negative rates and zero volatility are legal.
        assert!(GbmModel::new(100.0, -0.01, 0.0).is_ok());
    }

    #[test]
    fn test_zero_maturity_consumes_no_entropy() {
        let model = GbmModel::new(100.0, 0.05, 0.3).unwrap();
        let mut rng = Pcg64::seed_from_u64(9);
        let mut untouched = Pcg64::seed_from_u64(9);

        let prices = model.simulate_terminal(0.0, 16, &mut rng).unwrap();
        assert!(prices.iter().all(|&p| p == 100.0));
        assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let model = GbmModel::new(100.0, 0.02, 0.2).unwrap();
        let a = model
            .simulate_terminal(1.0, 1000, &mut Pcg64::seed_from_u64(42))
            .unwrap();
        let b = model
            .simulate_terminal(1.0, 1000, &mut Pcg64::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_terminal_mean_is_forward() {
        let model = GbmModel::new(100.0, 0.02, 0.2).unwrap();
        let prices = model
            .simulate_terminal(1.0, 200_000, &mut Pcg64::seed_from_u64(3))
            .unwrap();
        let mean = prices.iter().sum::<f64>() / prices.len() as f64;
        // E[S_T] = S0 e^{rT}; sd of the sample mean is ~0.045 here.
        assert_relative_eq!(mean, 100.0 * 0.02f64.exp(), epsilon = 0.25);
    }

    #[test]
    fn test_zero_vol_is_deterministic_forward() {
        let model = GbmModel::new(100.0, 0.03, 0.0).unwrap();
        let prices = model
            .simulate_terminal(2.0, 8, &mut Pcg64::seed_from_u64(1))
            .unwrap();
        for p in prices {
            assert_relative_eq!(p, 100.0 * 0.06f64.exp(), max_relative = 1e-14);
        }
    }

    #[test]
    fn test_simulate_rejects_zero_paths() {
        let model = GbmModel::new(100.0, 0.02, 0.2).unwrap();
        let err = model
            .simulate_terminal(1.0, 0, &mut Pcg64::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidConfiguration(_)));
    }
}
