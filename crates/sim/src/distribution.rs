use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::Serialize;

use mcengine_executor::ReferenceEngine;
use mcengine_shared::{EuropeanOption, GbmModel, PricingError, PricingResult, RunConfig};

use crate::histogram::Histogram;
use crate::paths::{simulate_paths, MoneynessCounts, PathSet};

pub const DEFAULT_SAMPLE_PATHS: usize = 50;
pub const MAX_SAMPLE_PATHS: usize = 1_000;

/// A handful of full paths for plotting, drawn on their own stream.
#[derive(Debug, Clone, Serialize)]
pub struct SamplePaths {
    pub moneyness: MoneynessCounts,
    pub paths: PathSet,
}

/// Terminal and payoff distributions of the draw a reference pricing uses.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionView {
    pub seed: u64,
    pub result: PricingResult,
    pub terminal: Histogram,
    pub discounted_payoffs: Histogram,
    /// `None` at zero maturity or when no sample paths were requested.
    pub sample_paths: Option<SamplePaths>,
}

/// Prices once with the reference engine and bins that exact sample. Sample
/// paths use the stream seeded at `seed + 1` and are capped at
/// [`MAX_SAMPLE_PATHS`].
pub fn distribution_view(
    model: GbmModel,
    option: &EuropeanOption,
    config: RunConfig,
    n_steps: usize,
    n_sample_paths: usize,
    n_bins: usize,
) -> Result<DistributionView, PricingError> {
    let sample = ReferenceEngine::new(model, config).price_sample(option)?;
    let terminal = Histogram::build(&sample.terminal_prices, n_bins)?;
    let discounted_payoffs = Histogram::build(&sample.discounted_payoffs, n_bins)?;

    let maturity = option.maturity();
    let sample_paths = if maturity > 0.0 && n_sample_paths > 0 {
        let mut rng = Pcg64::seed_from_u64(sample.seed.wrapping_add(1));
        let paths = simulate_paths(
            &model,
            maturity,
            n_steps,
            n_sample_paths.min(MAX_SAMPLE_PATHS),
            &mut rng,
        )?;
        Some(SamplePaths {
            moneyness: paths.classify(option),
            paths,
        })
    } else {
        None
    };

    Ok(DistributionView {
        seed: sample.seed,
        result: sample.result,
        terminal,
        discounted_payoffs,
        sample_paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::DEFAULT_BINS;

    fn model() -> GbmModel {
        GbmModel::new(100.0, 0.02, 0.2).unwrap()
    }

    #[test]
    fn test_histograms_describe_priced_sample() {
        let option = EuropeanOption::call(100.0, 1.0).unwrap();
        let config = RunConfig::new(4_000, Some(42));
        let view = distribution_view(model(), &option, config.clone(), 20, 10, DEFAULT_BINS).unwrap();

        let priced = ReferenceEngine::new(model(), config).price(&option).unwrap();
        assert_eq!(view.result, priced);
        assert_eq!(view.terminal.total(), 4_000);
        assert_eq!(view.discounted_payoffs.total(), 4_000);
        assert_eq!(view.discounted_payoffs.lower(), 0.0);

        let paths = view.sample_paths.unwrap();
        assert_eq!(paths.paths.n_paths(), 10);
        assert_eq!(paths.paths.n_steps(), 20);
        assert_eq!(paths.moneyness.total(), 10);
    }

    #[test]
    fn test_zero_maturity_collapses_to_single_bins() {
        let option = EuropeanOption::put(110.0, 0.0).unwrap();
        let view =
            distribution_view(model(), &option, RunConfig::new(500, Some(1)), 20, 10, DEFAULT_BINS)
                .unwrap();
        assert_eq!(view.terminal.counts(), &[500]);
        assert_eq!(view.terminal.lower(), 100.0);
        assert_eq!(view.discounted_payoffs.counts(), &[500]);
        assert_eq!(view.discounted_payoffs.lower(), 10.0);
        assert_eq!(view.result.price, 10.0);
        assert!(view.sample_paths.is_none());
    }

    #[test]
    fn test_sample_paths_are_capped() {
        let option = EuropeanOption::call(100.0, 0.25).unwrap();
        let view =
            distribution_view(model(), &option, RunConfig::new(100, Some(2)), 2, 5_000, 10).unwrap();
        assert_eq!(view.sample_paths.unwrap().paths.n_paths(), MAX_SAMPLE_PATHS);

        let none = distribution_view(model(), &option, RunConfig::new(100, Some(2)), 2, 0, 10).unwrap();
        assert!(none.sample_paths.is_none());
    }
}
