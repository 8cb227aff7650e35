mod commands;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mcengine_shared::config::{
    DEFAULT_MATURITY, DEFAULT_PATHS, DEFAULT_RATE, DEFAULT_SEED, DEFAULT_SPOT, DEFAULT_STRIKE,
    DEFAULT_VOL,
};
use mcengine_shared::{BackendKind, EuropeanOption, GbmModel, OptionType, PricingError, RunConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "mcengine", version, about = "Monte Carlo pricer for European options under GBM")]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Model and contract terms shared by every pricing command.
#[derive(Args, Debug, Clone)]
pub struct MarketArgs {
    /// Spot price S0
    #[arg(long, default_value_t = DEFAULT_SPOT)]
    spot: f64,
    /// Continuously compounded risk-free rate
    #[arg(long, default_value_t = DEFAULT_RATE)]
    rate: f64,
    /// Annualised volatility
    #[arg(long, default_value_t = DEFAULT_VOL)]
    vol: f64,
    /// Strike K
    #[arg(long, default_value_t = DEFAULT_STRIKE)]
    strike: f64,
    /// Time to maturity in years
    #[arg(long, default_value_t = DEFAULT_MATURITY)]
    maturity: f64,
    /// call or put
    #[arg(long = "type", default_value = "call")]
    option_type: OptionType,
}

impl MarketArgs {
    pub fn model(&self) -> Result<GbmModel, PricingError> {
        GbmModel::new(self.spot, self.rate, self.vol)
    }

    pub fn option(&self) -> Result<EuropeanOption, PricingError> {
        EuropeanOption::new(self.strike, self.maturity, self.option_type)
    }
}

#[derive(Args, Debug, Clone)]
pub struct SamplingArgs {
    /// Number of simulated paths
    #[arg(long, default_value_t = DEFAULT_PATHS)]
    paths: usize,
    /// Random seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Ignore --seed and draw fresh entropy for every pricing call
    #[arg(long)]
    entropy: bool,
}

impl SamplingArgs {
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(self.paths, (!self.entropy).then_some(self.seed))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Price one option and print the estimate with its 95% interval
    Price {
        #[command(flatten)]
        market: MarketArgs,
        #[command(flatten)]
        sampling: SamplingArgs,
        /// reference or accelerated
        #[arg(long, default_value = "reference")]
        backend: BackendKind,
        /// Use the reference engine if the accelerated one cannot be loaded
        #[arg(long)]
        fallback: bool,
    },
    /// Price with both engines and the closed form side by side
    Compare {
        #[command(flatten)]
        market: MarketArgs,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// Measure how often the 95% interval contains the closed-form price
    Coverage {
        #[command(flatten)]
        market: MarketArgs,
        /// Paths per run
        #[arg(long, default_value_t = 20_000)]
        paths: usize,
        #[arg(long, default_value = "reference")]
        backend: BackendKind,
        /// Number of seeds to sweep
        #[arg(long, default_value_t = 200)]
        runs: u32,
        /// Starting seed
        #[arg(long, default_value_t = 0)]
        seed_start: u64,
        /// Seed step between runs
        #[arg(long, default_value_t = 1)]
        seed_stride: u64,
        /// Number of parallel workers (0 = auto)
        #[arg(long, default_value_t = 0)]
        workers: usize,
    },
    /// Price at increasing path counts
    Convergence {
        #[command(flatten)]
        market: MarketArgs,
        #[arg(long, default_value = "reference")]
        backend: BackendKind,
        /// Comma-separated path counts
        #[arg(long, value_delimiter = ',', default_value = "1000,10000,100000,1000000")]
        ladder: Vec<usize>,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// Show the terminal and discounted-payoff distributions of a priced draw
    Paths {
        #[command(flatten)]
        market: MarketArgs,
        #[command(flatten)]
        sampling: SamplingArgs,
        /// Time steps per sample path
        #[arg(long, default_value_t = 252)]
        steps: usize,
        /// Full paths to simulate for plotting (skipped at zero maturity)
        #[arg(long, default_value_t = mcengine_sim::distribution::DEFAULT_SAMPLE_PATHS)]
        sample_paths: usize,
        /// Histogram bins
        #[arg(long, default_value_t = mcengine_sim::histogram::DEFAULT_BINS)]
        bins: usize,
    },
    /// Check a native kernel library (ABI version, exactness, agreement)
    Validate {
        /// Path to a shared library exporting the kernel ABI
        lib: PathBuf,
    },
    /// Build the native kernel as a shared library
    Build {
        /// Build in debug mode
        #[arg(long)]
        debug: bool,
    },
    /// Time the reference and accelerated engines
    Bench {
        #[command(flatten)]
        market: MarketArgs,
        #[command(flatten)]
        sampling: SamplingArgs,
        /// Timed calls per engine
        #[arg(long, default_value_t = 3)]
        repeats: u32,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;

    match cli.command {
        Commands::Price {
            market,
            sampling,
            backend,
            fallback,
        } => commands::price::run(&market, &sampling, backend, fallback, json),
        Commands::Compare { market, sampling } => {
            commands::price::compare(&market, &sampling, json)
        }
        Commands::Coverage {
            market,
            paths,
            backend,
            runs,
            seed_start,
            seed_stride,
            workers,
        } => commands::study::coverage(
            &market,
            paths,
            backend,
            runs,
            seed_start,
            seed_stride,
            workers,
            json,
        ),
        Commands::Convergence {
            market,
            backend,
            ladder,
            seed,
        } => commands::study::convergence(&market, backend, &ladder, seed, json),
        Commands::Paths {
            market,
            sampling,
            steps,
            sample_paths,
            bins,
        } => commands::study::paths(&market, &sampling, steps, sample_paths, bins, json),
        Commands::Validate { lib } => commands::validate::run(&lib),
        Commands::Build { debug } => commands::build::run(!debug),
        Commands::Bench {
            market,
            sampling,
            repeats,
        } => commands::study::bench(&market, &sampling, repeats, json),
    }
}
