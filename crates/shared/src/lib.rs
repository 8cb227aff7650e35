pub mod abi;
pub mod analytic;
pub mod config;
pub mod error;
pub mod model;
pub mod product;
pub mod result;
pub mod stats;

pub use analytic::black_scholes_price;
pub use config::{BackendKind, RunConfig, SeedSweep};
pub use error::PricingError;
pub use model::GbmModel;
pub use product::{EuropeanOption, Moneyness, OptionType};
pub use result::PricingResult;
pub use stats::RunningStats;
