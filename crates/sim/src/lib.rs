pub mod bench;
pub mod distribution;
pub mod histogram;
pub mod paths;
pub mod runner;

pub use distribution::{distribution_view, DistributionView, SamplePaths};
pub use histogram::Histogram;
pub use paths::{simulate_paths, MoneynessCounts, PathSet};
pub use runner::{
    compare_backends, run_convergence, run_coverage, BackendComparison, ConvergenceRow,
    CoverageReport,
};
