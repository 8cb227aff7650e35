use mcengine_shared::{
    EuropeanOption, GbmModel, PricingError, PricingResult, RunConfig, RunningStats,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::debug;

/// One priced draw kept whole: the terminal prices, their discounted
/// payoffs, and the result `price` would return for the same seed.
#[derive(Debug, Clone)]
pub struct PricedSample {
    pub seed: u64,
    pub terminal_prices: Vec<f64>,
    pub discounted_payoffs: Vec<f64>,
    pub result: PricingResult,
}

/// Straightforward batch Monte Carlo: materialise every terminal price, map
/// to payoffs, discount, then reduce. Single-threaded with a fixed path
/// order, so a fixed seed gives a bit-identical result.
#[derive(Debug, Clone)]
pub struct ReferenceEngine {
    model: GbmModel,
    config: RunConfig,
}

impl ReferenceEngine {
    pub fn new(model: GbmModel, config: RunConfig) -> Self {
        Self { model, config }
    }

    pub fn model(&self) -> &GbmModel {
        &self.model
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Prices with a fresh generator seeded from the run configuration.
    pub fn price(&self, product: &EuropeanOption) -> Result<PricingResult, PricingError> {
        self.config.validate()?;
        let seed = self.config.resolve_seed();
        debug!(
            backend = "reference",
            n_paths = self.config.n_paths,
            seed,
            option = %product.option_type(),
            "pricing"
        );
        self.price_with_rng(product, &mut Pcg64::seed_from_u64(seed))
    }

    /// Prices drawing from a caller-owned random source.
    pub fn price_with_rng<R: Rng + ?Sized>(
        &self,
        product: &EuropeanOption,
        rng: &mut R,
    ) -> Result<PricingResult, PricingError> {
        let discounted = self.discounted_payoffs_with_rng(product, rng)?;
        let stats = RunningStats::from_slice(&discounted);
        PricingResult::from_stats(&stats)
    }

    pub fn price_sample(&self, product: &EuropeanOption) -> Result<PricedSample, PricingError> {
        self.config.validate()?;
        let seed = self.config.resolve_seed();
        let mut rng = Pcg64::seed_from_u64(seed);
        let maturity = product.maturity();

        let terminal_prices = self
            .model
            .simulate_terminal(maturity, self.config.n_paths, &mut rng)?;
        let discount = self.model.discount_factor(maturity);
        let discounted_payoffs: Vec<f64> = product
            .payoff(&terminal_prices)
            .into_iter()
            .map(|p| discount * p)
            .collect();
        let result = PricingResult::from_stats(&RunningStats::from_slice(&discounted_payoffs))?;

        Ok(PricedSample {
            seed,
            terminal_prices,
            discounted_payoffs,
            result,
        })
    }

    /// Per-path discounted payoffs `X_i` for the configured seed.
    pub fn discounted_payoffs(&self, product: &EuropeanOption) -> Result<Vec<f64>, PricingError> {
        self.config.validate()?;
        let mut rng = Pcg64::seed_from_u64(self.config.resolve_seed());
        self.discounted_payoffs_with_rng(product, &mut rng)
    }

    pub fn discounted_payoffs_with_rng<R: Rng + ?Sized>(
        &self,
        product: &EuropeanOption,
        rng: &mut R,
    ) -> Result<Vec<f64>, PricingError> {
        self.config.validate()?;
        let maturity = product.maturity();

        let terminal = self
            .model
            .simulate_terminal(maturity, self.config.n_paths, rng)?;
        let payoffs = product.payoff(&terminal);
        let discount = self.model.discount_factor(maturity);
        Ok(payoffs.into_iter().map(|p| discount * p).collect())
    }
}
