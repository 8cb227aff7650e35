use std::time::Instant;

use serde::Serialize;

use mcengine_executor::{Engine, PricingBackend};
use mcengine_shared::{black_scholes_price, BackendKind, PricingResult};
use mcengine_sim::compare_backends;

use crate::output;
use crate::{MarketArgs, SamplingArgs};

#[derive(Serialize)]
struct PriceReport {
    backend: BackendKind,
    analytic: f64,
    elapsed_secs: f64,
    #[serde(flatten)]
    result: PricingResult,
}

pub fn run(
    market: &MarketArgs,
    sampling: &SamplingArgs,
    backend: BackendKind,
    fallback: bool,
    json: bool,
) -> anyhow::Result<()> {
    let model = market.model()?;
    let option = market.option()?;
    let config = sampling.run_config();

    let engine = if fallback {
        Engine::with_fallback(backend, model, config)
    } else {
        Engine::new(backend, model, config)?
    };

    let start = Instant::now();
    let result = engine.price(&option)?;
    let elapsed = start.elapsed();
    let analytic = black_scholes_price(&model, &option);

    if json {
        return output::print_json(&PriceReport {
            backend: engine.kind(),
            analytic,
            elapsed_secs: elapsed.as_secs_f64(),
            result,
        });
    }
    output::print_price(engine.kind(), analytic, &result, elapsed);
    Ok(())
}

pub fn compare(market: &MarketArgs, sampling: &SamplingArgs, json: bool) -> anyhow::Result<()> {
    let cmp = compare_backends(market.model()?, market.option()?, sampling.run_config())?;
    if json {
        return output::print_json(&cmp);
    }
    output::print_comparison(&cmp);
    Ok(())
}
