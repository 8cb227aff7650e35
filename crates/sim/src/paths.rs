use mcengine_shared::{EuropeanOption, GbmModel, Moneyness, PricingError};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::Serialize;

/// Exact log-normal stepping over a fixed `dt`.
struct GbmStepper {
    current_price: f64,
    drift_term: f64,
    vol_term: f64,
}

impl GbmStepper {
    fn new(model: &GbmModel, dt: f64) -> Self {
        let vol = model.vol();
        Self {
            current_price: model.spot(),
            drift_term: (model.rate() - 0.5 * vol * vol) * dt,
            vol_term: vol * dt.sqrt(),
        }
    }

    #[inline]
    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        self.current_price *= (self.drift_term + self.vol_term * z).exp();
        self.current_price
    }
}

/// Simulated price paths on a uniform time grid. Every path starts at the
/// model's spot and has `times.len()` points.
#[derive(Debug, Clone, Serialize)]
pub struct PathSet {
    times: Vec<f64>,
    paths: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MoneynessCounts {
    pub in_the_money: usize,
    pub at_the_money: usize,
    pub out_of_the_money: usize,
}

impl MoneynessCounts {
    pub fn total(&self) -> usize {
        self.in_the_money + self.at_the_money + self.out_of_the_money
    }
}

pub fn simulate_paths<R: Rng + ?Sized>(
    model: &GbmModel,
    maturity: f64,
    n_steps: usize,
    n_paths: usize,
    rng: &mut R,
) -> Result<PathSet, PricingError> {
    if !maturity.is_finite() || maturity <= 0.0 {
        return Err(PricingError::InvalidConfiguration(format!(
            "path simulation needs maturity > 0, got {maturity}"
        )));
    }
    if n_steps < 1 {
        return Err(PricingError::InvalidConfiguration(
            "n_steps must be >= 1".to_string(),
        ));
    }
    if n_paths < 1 {
        return Err(PricingError::InvalidConfiguration(
            "n_paths must be >= 1".to_string(),
        ));
    }

    let dt = maturity / n_steps as f64;
    let times = (0..=n_steps).map(|k| k as f64 * dt).collect();

    let paths = (0..n_paths)
        .map(|_| {
            let mut stepper = GbmStepper::new(model, dt);
            let mut path = Vec::with_capacity(n_steps + 1);
            path.push(model.spot());
            for _ in 0..n_steps {
                path.push(stepper.step(rng));
            }
            path
        })
        .collect();

    Ok(PathSet { times, paths })
}

impl PathSet {
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn paths(&self) -> &[Vec<f64>] {
        &self.paths
    }

    pub fn n_paths(&self) -> usize {
        self.paths.len()
    }

    pub fn n_steps(&self) -> usize {
        self.times.len() - 1
    }

    pub fn terminal_prices(&self) -> Vec<f64> {
        self.paths
            .iter()
            .filter_map(|p| p.last().copied())
            .collect()
    }

    /// Counts paths by where they finish relative to the option's strike.
    pub fn classify(&self, option: &EuropeanOption) -> MoneynessCounts {
        let mut counts = MoneynessCounts::default();
        for s_t in self.terminal_prices() {
            match option.moneyness(s_t) {
                Moneyness::InTheMoney => counts.in_the_money += 1,
                Moneyness::AtTheMoney => counts.at_the_money += 1,
                Moneyness::OutOfTheMoney => counts.out_of_the_money += 1,
            }
        }
        counts
    }
}
