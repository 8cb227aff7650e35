use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use mcengine_executor::{Engine, PricingBackend};
use mcengine_shared::config::SeedSweep;
use mcengine_shared::result::PricingBatch;
use mcengine_shared::{
    black_scholes_price, BackendKind, EuropeanOption, GbmModel, PricingResult, RunConfig,
};

pub const DEFAULT_LADDER: [usize; 4] = [1_000, 10_000, 100_000, 1_000_000];

#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub backend: BackendKind,
    pub analytic: f64,
    pub n_paths: usize,
    pub batch: PricingBatch,
}

impl CoverageReport {
    /// Fraction of 95% intervals containing the analytic price.
    pub fn coverage(&self) -> f64 {
        self.batch.coverage(self.analytic)
    }
}

/// Prices `option` once per seed of `sweep`, in parallel.
pub fn run_coverage(
    kind: BackendKind,
    model: GbmModel,
    option: EuropeanOption,
    n_paths: usize,
    sweep: &SeedSweep,
    n_workers: Option<usize>,
) -> anyhow::Result<CoverageReport> {
    if sweep.n_runs == 0 {
        anyhow::bail!("coverage sweep needs at least one run");
    }
    let configs = sweep.generate_configs(&RunConfig::new(n_paths, None));
    let seeds: Vec<u64> = (0..sweep.n_runs).map(|i| sweep.seed(i)).collect();

    let engines = configs
        .into_iter()
        .map(|config| Engine::new(kind, model, config))
        .collect::<Result<Vec<_>, _>>()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_workers.unwrap_or_else(|| rayon::current_num_threads().min(8)))
        .build()?;

    let results: Result<Vec<PricingResult>, _> =
        pool.install(|| engines.par_iter().map(|e| e.price(&option)).collect());

    let report = CoverageReport {
        backend: kind,
        analytic: black_scholes_price(&model, &option),
        n_paths,
        batch: PricingBatch::from_results(seeds, results?),
    };
    info!(
        backend = %kind,
        runs = report.batch.n_runs(),
        n_paths,
        coverage = report.coverage(),
        "coverage sweep complete"
    );
    Ok(report)
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConvergenceRow {
    pub n_paths: usize,
    pub price: f64,
    pub std_error: f64,
    pub abs_error: f64,
    /// `std_error · √n`, which should settle to the payoff's standard deviation.
    pub scaled_error: f64,
}

pub fn run_convergence(
    kind: BackendKind,
    model: GbmModel,
    option: EuropeanOption,
    ladder: &[usize],
    seed: Option<u64>,
) -> anyhow::Result<Vec<ConvergenceRow>> {
    let analytic = black_scholes_price(&model, &option);
    let mut rows = Vec::with_capacity(ladder.len());
    for &n_paths in ladder {
        let engine = Engine::new(kind, model, RunConfig::new(n_paths, seed))?;
        let res = engine.price(&option)?;
        rows.push(ConvergenceRow {
            n_paths,
            price: res.price,
            std_error: res.std_error,
            abs_error: (res.price - analytic).abs(),
            scaled_error: res.std_error * (n_paths as f64).sqrt(),
        });
    }
    info!(backend = %kind, rungs = rows.len(), "convergence ladder complete");
    Ok(rows)
}

#[derive(Debug, Clone, Serialize)]
pub struct BackendComparison {
    pub analytic: f64,
    pub reference: PricingResult,
    pub accelerated: PricingResult,
}

impl BackendComparison {
    /// Reference minus accelerated, in units of their combined standard error.
    pub fn diff_in_se(&self) -> f64 {
        let diff = self.reference.price - self.accelerated.price;
        let se = self.reference.std_error.hypot(self.accelerated.std_error);
        if se == 0.0 {
            if diff == 0.0 {
                0.0
            } else {
                f64::INFINITY.copysign(diff)
            }
        } else {
            diff / se
        }
    }

    pub fn agrees(&self, tolerance_se: f64) -> bool {
        self.diff_in_se().abs() <= tolerance_se
    }
}

pub fn compare_backends(
    model: GbmModel,
    option: EuropeanOption,
    config: RunConfig,
) -> anyhow::Result<BackendComparison> {
    let reference = Engine::new(BackendKind::Reference, model, config.clone())?;
    let accelerated = Engine::new(BackendKind::Accelerated, model, config)?;
    Ok(BackendComparison {
        analytic: black_scholes_price(&model, &option),
        reference: reference.price(&option)?,
        accelerated: accelerated.price(&option)?,
    })
}
