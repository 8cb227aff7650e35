use std::time::Instant;

use serde::Serialize;

use mcengine_executor::{Engine, PricingBackend};
use mcengine_shared::{BackendKind, EuropeanOption, GbmModel, RunConfig};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BenchTiming {
    pub backend: BackendKind,
    pub n_paths: usize,
    pub repeats: u32,
    pub secs_per_call: f64,
}

impl BenchTiming {
    pub fn paths_per_sec(&self) -> f64 {
        if self.secs_per_call > 0.0 {
            self.n_paths as f64 / self.secs_per_call
        } else {
            f64::INFINITY
        }
    }
}

/// Average wall time of `repeats` pricing calls after one warmup call.
pub fn time_backend(
    backend: &dyn PricingBackend,
    option: &EuropeanOption,
    repeats: u32,
) -> anyhow::Result<BenchTiming> {
    let repeats = repeats.max(1);
    backend.price(option)?;

    let start = Instant::now();
    for _ in 0..repeats {
        backend.price(option)?;
    }
    let elapsed = start.elapsed();

    Ok(BenchTiming {
        backend: backend.kind(),
        n_paths: backend.config().n_paths,
        repeats,
        secs_per_call: elapsed.as_secs_f64() / repeats as f64,
    })
}

/// Times the reference engine and, when available, the accelerated one.
pub fn run_profile(
    model: GbmModel,
    option: EuropeanOption,
    config: RunConfig,
    repeats: u32,
) -> anyhow::Result<Vec<BenchTiming>> {
    let mut timings = Vec::with_capacity(2);
    let reference = Engine::new(BackendKind::Reference, model, config.clone())?;
    timings.push(time_backend(&reference, &option, repeats)?);

    match Engine::new(BackendKind::Accelerated, model, config) {
        Ok(accelerated) => timings.push(time_backend(&accelerated, &option, repeats)?),
        Err(err) if err.is_recoverable() => {
            tracing::warn!(error = %err, "skipping accelerated benchmark");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(timings)
}

/// Reference time over accelerated time, if both were measured.
pub fn speedup(timings: &[BenchTiming]) -> Option<f64> {
    let of = |kind: BackendKind| timings.iter().find(|t| t.backend == kind);
    let reference = of(BackendKind::Reference)?;
    let accelerated = of(BackendKind::Accelerated)?;
    (accelerated.secs_per_call > 0.0).then(|| reference.secs_per_call / accelerated.secs_per_call)
}
