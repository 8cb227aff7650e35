use mcengine_shared::{EuropeanOption, GbmModel, RunConfig};
use mcengine_sim::bench;

fn main() {
    let model = GbmModel::new(100.0, 0.02, 0.2).unwrap();
    let option = EuropeanOption::call(100.0, 1.0).unwrap();

    for n_paths in [100_000, 1_000_000, 10_000_000] {
        println!("Pricing ATM call with {} paths...", n_paths);
        let timings = bench::run_profile(model, option, RunConfig::new(n_paths, Some(42)), 3)
            .unwrap();

        println!("========================================");
        for t in &timings {
            println!(
                "  {:<12} {:>9.4}s/call  {:>14.0} paths/s",
                t.backend.to_string(),
                t.secs_per_call,
                t.paths_per_sec()
            );
        }
        if let Some(x) = bench::speedup(&timings) {
            println!("  Speedup:     {:.1}x", x);
        }
        println!("========================================");
    }
}
