use std::time::Duration;

use serde::Serialize;

use mcengine_shared::{BackendKind, PricingResult};
use mcengine_sim::bench::{self, BenchTiming};
use mcengine_sim::{
    BackendComparison, ConvergenceRow, CoverageReport, DistributionView, Histogram, MoneynessCounts,
};

const BAR_WIDTH: usize = 50;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_price(backend: BackendKind, analytic: f64, result: &PricingResult, elapsed: Duration) {
    let (lo, hi) = result.confidence_interval_95;
    println!("\n========================================");
    println!("  Backend:     {}", backend);
    println!("  Paths:       {}", result.n_paths);
    println!("  Time:        {:.3}s", elapsed.as_secs_f64());
    println!("  MC price:    {:.6}", result.price);
    println!("  Std error:   {:.6}", result.std_error);
    println!("  95% CI:      [{:.6}, {:.6}]", lo, hi);
    println!("  Analytic:    {:.6}", analytic);
    println!(
        "  In CI:       {}",
        if result.contains(analytic) { "yes" } else { "no" }
    );
    println!("========================================");
}

pub fn print_comparison(cmp: &BackendComparison) {
    println!("\n========================================");
    println!("  Analytic:     {:.6}", cmp.analytic);
    for (name, r) in [("Reference", &cmp.reference), ("Accelerated", &cmp.accelerated)] {
        println!(
            "  {:<12}  {:.6} ± {:.6}  (err {:+.6})",
            name,
            r.price,
            r.half_width(),
            r.price - cmp.analytic
        );
    }
    println!("  Difference:   {:+.2} SE", cmp.diff_in_se());
    println!("========================================");
}

pub fn print_coverage(report: &CoverageReport, elapsed: Duration) {
    println!("\n========================================");
    println!("  Backend:     {}", report.backend);
    println!("  Runs:        {}", report.batch.n_runs());
    println!("  Paths/run:   {}", report.n_paths);
    println!("  Time:        {:.2}s", elapsed.as_secs_f64());
    println!("  Analytic:    {:.6}", report.analytic);
    println!("  Mean price:  {:.6}", report.batch.mean_price());
    println!("  Mean SE:     {:.6}", report.batch.mean_std_error());
    println!("  Coverage:    {:.1}%", 100.0 * report.coverage());
    println!("========================================");
}

pub fn print_convergence(analytic: f64, rows: &[ConvergenceRow]) {
    println!("\nAnalytic: {:.6}", analytic);
    println!(
        "{:>12}  {:>12}  {:>10}  {:>10}  {:>10}",
        "paths", "price", "std err", "|error|", "SE*sqrt(n)"
    );
    for row in rows {
        println!(
            "{:>12}  {:>12.6}  {:>10.6}  {:>10.6}  {:>10.4}",
            row.n_paths, row.price, row.std_error, row.abs_error, row.scaled_error
        );
    }
}

fn print_moneyness(counts: &MoneynessCounts) {
    let total = counts.total().max(1) as f64;
    println!("\nAt expiry:");
    for (label, n) in [
        ("In the money", counts.in_the_money),
        ("At the money", counts.at_the_money),
        ("Out of the money", counts.out_of_the_money),
    ] {
        println!("  {:<18} {:>8}  ({:.1}%)", label, n, 100.0 * n as f64 / total);
    }
}

fn print_histogram(title: &str, hist: &Histogram) {
    let peak = hist.counts().iter().copied().max().unwrap_or(0).max(1);
    println!("\n{} ({} samples, {} bins)", title, hist.total(), hist.n_bins());
    for (centre, &count) in hist.centres().iter().zip(hist.counts()) {
        let len = (count as usize * BAR_WIDTH).div_ceil(peak as usize);
        println!("  {:>10.3} | {:<width$} {}", centre, "#".repeat(len), count, width = BAR_WIDTH);
    }
}

pub fn print_distribution(view: &DistributionView) {
    let (lo, hi) = view.result.confidence_interval_95;
    println!("\nSeed {}: price {:.6}  95% CI [{:.6}, {:.6}]", view.seed, view.result.price, lo, hi);
    if let Some(sample) = &view.sample_paths {
        println!(
            "Sample paths: {} x {} steps",
            sample.paths.n_paths(),
            sample.paths.n_steps()
        );
        print_moneyness(&sample.moneyness);
    }
    print_histogram("Terminal price S_T", &view.terminal);
    print_histogram("Discounted payoff", &view.discounted_payoffs);
}

pub fn print_bench(timings: &[BenchTiming]) {
    println!("\n========================================");
    for t in timings {
        println!(
            "  {:<12} {:>9.4}s/call  {:>14.0} paths/s",
            t.backend.to_string(),
            t.secs_per_call,
            t.paths_per_sec()
        );
    }
    if let Some(x) = bench::speedup(timings) {
        println!("  Speedup:     {:.1}x", x);
    }
    println!("========================================");
}
