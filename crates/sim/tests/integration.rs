use approx::assert_relative_eq;
use mcengine_executor::{AcceleratedEngine, Engine, PricingBackend, ReferenceEngine};
use mcengine_shared::config::SeedSweep;
use mcengine_shared::{
    black_scholes_price, BackendKind, EuropeanOption, GbmModel, PricingError, RunConfig,
};
use mcengine_sim::histogram::{Histogram, DEFAULT_BINS};
use mcengine_sim::{compare_backends, run_convergence, run_coverage, simulate_paths};
use rand::SeedableRng;
use rand_pcg::Pcg64;

fn atm_model() -> GbmModel {
    GbmModel::new(100.0, 0.02, 0.2).unwrap()
}

fn sweep(n_runs: u32) -> SeedSweep {
    SeedSweep {
        seed_start: 1_000,
        seed_stride: 1,
        n_runs,
    }
}

#[test]
fn test_reference_interval_coverage() {
    let option = EuropeanOption::call(100.0, 1.0).unwrap();
    let report =
        run_coverage(BackendKind::Reference, atm_model(), option, 10_000, &sweep(200), None)
            .unwrap();
    let coverage = report.coverage();
    assert!(
        (0.88..=0.995).contains(&coverage),
        "reference coverage {coverage}"
    );
}

#[test]
fn test_accelerated_interval_coverage() {
    let option = EuropeanOption::put(105.0, 0.5).unwrap();
    let report =
        run_coverage(BackendKind::Accelerated, atm_model(), option, 20_000, &sweep(200), None)
            .unwrap();
    let coverage = report.coverage();
    assert!(
        (0.88..=0.995).contains(&coverage),
        "accelerated coverage {coverage}"
    );
}

#[test]
fn test_std_error_shrinks_with_root_n() {
    let option = EuropeanOption::call(100.0, 1.0).unwrap();
    for kind in [BackendKind::Reference, BackendKind::Accelerated] {
        let rows =
            run_convergence(kind, atm_model(), option, &[10_000, 1_000_000], Some(11)).unwrap();
        assert_relative_eq!(
            rows[0].std_error / rows[1].std_error,
            10.0,
            max_relative = 0.1
        );
        assert_relative_eq!(rows[0].scaled_error, rows[1].scaled_error, max_relative = 0.1);
    }
}

#[test]
fn test_backends_agree_at_one_million_paths() {
    for option in [
        EuropeanOption::call(100.0, 1.0).unwrap(),
        EuropeanOption::put(90.0, 2.0).unwrap(),
    ] {
        let cmp = compare_backends(atm_model(), option, RunConfig::new(1_000_000, Some(7))).unwrap();
        assert!(cmp.agrees(5.0), "backends disagree: {:?}", cmp);
        let larger_se = cmp.reference.std_error.max(cmp.accelerated.std_error);
        assert!((cmp.reference.price - cmp.accelerated.price).abs() < 5.0 * larger_se);
        assert!((cmp.reference.price - cmp.analytic).abs() < 5.0 * cmp.reference.std_error);
        assert!((cmp.accelerated.price - cmp.analytic).abs() < 5.0 * cmp.accelerated.std_error);
    }
}

#[test]
fn test_zero_maturity_all_pricers_exact() {
    let model = GbmModel::new(110.0, 0.05, 0.3).unwrap();
    let config = RunConfig::new(1_000, None);
    for (option, intrinsic) in [
        (EuropeanOption::call(100.0, 0.0).unwrap(), 10.0),
        (EuropeanOption::put(100.0, 0.0).unwrap(), 0.0),
        (EuropeanOption::put(120.0, 0.0).unwrap(), 10.0),
    ] {
        assert_eq!(black_scholes_price(&model, &option), intrinsic);
        for kind in [BackendKind::Reference, BackendKind::Accelerated] {
            let res = Engine::new(kind, model, config.clone())
                .unwrap()
                .price(&option)
                .unwrap();
            assert_eq!(res.price, intrinsic, "{kind}");
            assert_eq!(res.std_error, 0.0);
            assert_eq!(res.confidence_interval_95, (intrinsic, intrinsic));
        }
    }
}

#[test]
fn test_zero_vol_matches_deterministic_limit() {
    let model = GbmModel::new(100.0, 0.05, 0.0).unwrap();
    let option = EuropeanOption::call(100.0, 1.0).unwrap();
    let exact = black_scholes_price(&model, &option);
    assert_relative_eq!(exact, 100.0 - 100.0 * (-0.05f64).exp(), max_relative = 1e-12);
    for kind in [BackendKind::Reference, BackendKind::Accelerated] {
        let res = Engine::new(kind, model, RunConfig::new(500, Some(3)))
            .unwrap()
            .price(&option)
            .unwrap();
        assert_relative_eq!(res.price, exact, max_relative = 1e-12);
        assert_eq!(res.std_error, 0.0);
    }
}

#[test]
fn test_fixed_seed_reproducible_per_backend() {
    let option = EuropeanOption::put(100.0, 1.0).unwrap();
    for kind in [BackendKind::Reference, BackendKind::Accelerated] {
        let price = |seed| {
            Engine::new(kind, atm_model(), RunConfig::new(30_000, Some(seed)))
                .unwrap()
                .price(&option)
                .unwrap()
        };
        assert_eq!(price(5), price(5));
        assert_ne!(price(5).price, price(6).price);
    }
}

#[test]
fn test_fallback_to_reference() {
    let missing = AcceleratedEngine::from_library(
        "/definitely/not/here/libmc_core.so",
        atm_model(),
        RunConfig::default(),
    )
    .map(Engine::Accelerated);
    assert!(matches!(missing, Err(PricingError::BackendUnavailable(_))));

    let engine = Engine::or_reference(missing, atm_model(), RunConfig::new(1_000, Some(1))).unwrap();
    assert_eq!(engine.kind(), BackendKind::Reference);
    let direct = ReferenceEngine::new(atm_model(), RunConfig::new(1_000, Some(1)));
    let option = EuropeanOption::call(100.0, 1.0).unwrap();
    assert_eq!(engine.price(&option).unwrap(), direct.price(&option).unwrap());
}

#[test]
fn test_terminal_histogram_from_paths() {
    let mut rng = Pcg64::seed_from_u64(21);
    let paths = simulate_paths(&atm_model(), 1.0, 12, 5_000, &mut rng).unwrap();
    let terminal = paths.terminal_prices();
    let hist = Histogram::build(&terminal, DEFAULT_BINS).unwrap();
    assert_eq!(hist.total(), 5_000);
    assert_eq!(hist.n_bins(), DEFAULT_BINS);

    let counts = paths.classify(&EuropeanOption::call(100.0, 1.0).unwrap());
    assert_eq!(counts.total(), 5_000);
}

#[test]
fn test_invalid_inputs_rejected_everywhere() {
    assert!(matches!(
        GbmModel::new(-1.0, 0.02, 0.2),
        Err(PricingError::InvalidParameter { .. })
    ));
    assert!(matches!(
        EuropeanOption::call(100.0, -1.0),
        Err(PricingError::InvalidParameter { .. })
    ));
    let option = EuropeanOption::call(100.0, 1.0).unwrap();
    for kind in [BackendKind::Reference, BackendKind::Accelerated] {
        let err = Engine::new(kind, atm_model(), RunConfig::new(0, Some(1)))
            .unwrap()
            .price(&option)
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidConfiguration(_)));
    }
}

#[test]
fn test_overflowing_drift_is_numeric_degenerate() {
    let model = GbmModel::new(100.0, 80.0, 0.2).unwrap();
    let option = EuropeanOption::call(100.0, 10.0).unwrap();
    for kind in [BackendKind::Reference, BackendKind::Accelerated] {
        let err = Engine::new(kind, model, RunConfig::new(1_000, Some(1)))
            .unwrap()
            .price(&option)
            .unwrap_err();
        assert!(matches!(err, PricingError::NumericDegenerate(_)), "{kind}: {err}");
    }
}
