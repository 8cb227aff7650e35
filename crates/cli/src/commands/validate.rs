use std::path::Path;
use std::sync::Arc;

use mcengine_executor::{AcceleratedEngine, NativeLibrary, ReferenceEngine};
use mcengine_shared::abi::KERNEL_ABI_VERSION;
use mcengine_shared::{black_scholes_price, EuropeanOption, GbmModel, PricingError, RunConfig};

const PARITY_PATHS: usize = 400_000;
const PARITY_TOLERANCE_SE: f64 = 5.0;

pub fn run(lib: &Path) -> anyhow::Result<()> {
    println!("Validating kernel: {}", lib.display());

    let library = Arc::new(NativeLibrary::load(lib)?);
    println!(
        "  [PASS] Library loaded, ABI v{} (expected v{})",
        library.abi_version(),
        KERNEL_ABI_VERSION
    );

    let model = GbmModel::new(105.0, 0.03, 0.25)?;
    let engine = |config: RunConfig| AcceleratedEngine::with_library(library.clone(), model, config);

    // Zero maturity must return intrinsic value exactly
    for (option, intrinsic) in [
        (EuropeanOption::call(100.0, 0.0)?, 5.0),
        (EuropeanOption::put(100.0, 0.0)?, 0.0),
    ] {
        let res = engine(RunConfig::new(1_000, Some(1))).price(&option)?;
        if res.price != intrinsic || res.std_error != 0.0 {
            anyhow::bail!(
                "FAIL: T=0 {} priced at {} ± {} (expected exactly {})",
                option.option_type(),
                res.price,
                res.std_error,
                intrinsic
            );
        }
    }
    println!("  [PASS] Zero maturity returns intrinsic value");

    // Invalid requests are rejected, not priced
    match engine(RunConfig::new(0, Some(1))).price(&EuropeanOption::call(100.0, 1.0)?) {
        Err(PricingError::InvalidConfiguration(_)) => {}
        other => anyhow::bail!("FAIL: zero-path request was not rejected: {:?}", other),
    }
    println!("  [PASS] Zero-path request rejected");

    // Same seed, same answer
    let option = EuropeanOption::call(100.0, 1.0)?;
    let a = engine(RunConfig::new(50_000, Some(9))).price(&option)?;
    let b = engine(RunConfig::new(50_000, Some(9))).price(&option)?;
    if a != b {
        anyhow::bail!("FAIL: seeded runs differ ({} vs {})", a.price, b.price);
    }
    println!("  [PASS] Seeded runs reproducible");

    // Statistical agreement with the reference engine and the closed form
    println!("  Checking agreement ({} paths)...", PARITY_PATHS);
    for option in [
        EuropeanOption::call(100.0, 1.0)?,
        EuropeanOption::put(110.0, 0.5)?,
    ] {
        let config = RunConfig::new(PARITY_PATHS, Some(42));
        let native = engine(config.clone()).price(&option)?;
        let reference = ReferenceEngine::new(model, config).price(&option)?;
        let analytic = black_scholes_price(&model, &option);

        let se = native.std_error.hypot(reference.std_error);
        let diff = (native.price - reference.price).abs();
        if diff > PARITY_TOLERANCE_SE * se {
            anyhow::bail!(
                "FAIL: {} disagrees with reference: {:.6} vs {:.6} ({:.2} SE)",
                option.option_type(),
                native.price,
                reference.price,
                diff / se
            );
        }
        if (native.price - analytic).abs() > PARITY_TOLERANCE_SE * native.std_error {
            anyhow::bail!(
                "FAIL: {} far from closed form: {:.6} vs {:.6} (se {:.6})",
                option.option_type(),
                native.price,
                analytic,
                native.std_error
            );
        }
        println!(
            "  [PASS] {}: native={:.6} reference={:.6} analytic={:.6}",
            option.option_type(),
            native.price,
            reference.price,
            analytic
        );
    }

    println!("\nAll checks passed.");
    Ok(())
}
