use std::time::Instant;

use serde::Serialize;

use mcengine_shared::config::SeedSweep;
use mcengine_shared::{black_scholes_price, BackendKind};
use mcengine_sim::{bench, distribution_view, run_convergence, run_coverage};

use crate::output;
use crate::{MarketArgs, SamplingArgs};

#[allow(clippy::too_many_arguments)]
pub fn coverage(
    market: &MarketArgs,
    paths: usize,
    backend: BackendKind,
    runs: u32,
    seed_start: u64,
    seed_stride: u64,
    workers: usize,
    json: bool,
) -> anyhow::Result<()> {
    let sweep = SeedSweep {
        seed_start,
        seed_stride,
        n_runs: runs,
    };
    let n_workers = if workers == 0 { None } else { Some(workers) };

    if !json {
        println!("Pricing {} runs ({} paths each)...", runs, paths);
    }
    let start = Instant::now();
    let report = run_coverage(
        backend,
        market.model()?,
        market.option()?,
        paths,
        &sweep,
        n_workers,
    )?;
    let elapsed = start.elapsed();

    if json {
        #[derive(Serialize)]
        struct Summary<'a> {
            coverage: f64,
            #[serde(flatten)]
            report: &'a mcengine_sim::CoverageReport,
        }
        return output::print_json(&Summary {
            coverage: report.coverage(),
            report: &report,
        });
    }
    output::print_coverage(&report, elapsed);
    Ok(())
}

pub fn convergence(
    market: &MarketArgs,
    backend: BackendKind,
    ladder: &[usize],
    seed: u64,
    json: bool,
) -> anyhow::Result<()> {
    let model = market.model()?;
    let option = market.option()?;
    let rows = run_convergence(backend, model, option, ladder, Some(seed))?;
    if json {
        return output::print_json(&rows);
    }
    output::print_convergence(black_scholes_price(&model, &option), &rows);
    Ok(())
}

pub fn paths(
    market: &MarketArgs,
    sampling: &SamplingArgs,
    n_steps: usize,
    n_sample_paths: usize,
    bins: usize,
    json: bool,
) -> anyhow::Result<()> {
    let view = distribution_view(
        market.model()?,
        &market.option()?,
        sampling.run_config(),
        n_steps,
        n_sample_paths,
        bins,
    )?;

    if json {
        return output::print_json(&view);
    }
    output::print_distribution(&view);
    Ok(())
}

pub fn bench(
    market: &MarketArgs,
    sampling: &SamplingArgs,
    repeats: u32,
    json: bool,
) -> anyhow::Result<()> {
    let timings = bench::run_profile(
        market.model()?,
        market.option()?,
        sampling.run_config(),
        repeats,
    )?;
    if json {
        return output::print_json(&timings);
    }
    output::print_bench(&timings);
    Ok(())
}
