//! C ABI between the executor and a native pricing kernel.
//!
//! Request layout (`#[repr(C)]`, 64 bytes):
//! | Offset | Size | Field       | Type | Description                  |
//! |--------|------|-------------|------|------------------------------|
//! | 0      | 8    | spot        | f64  | S0                           |
//! | 8      | 8    | rate        | f64  | r                            |
//! | 16     | 8    | vol         | f64  | sigma                        |
//! | 24     | 8    | strike      | f64  | K                            |
//! | 32     | 8    | maturity    | f64  | T in years                   |
//! | 40     | 8    | n_paths     | u64  | sample size                  |
//! | 48     | 8    | seed        | u64  | resolved seed                |
//! | 56     | 1    | option_kind | u8   | 0=call, 1=put                |

use crate::config::RunConfig;
use crate::error::PricingError;
use crate::model::GbmModel;
use crate::product::{EuropeanOption, OptionType};

pub const KERNEL_ABI_VERSION: u32 = 1;

pub const PRICE_SYMBOL: &[u8] = b"mcengine_price_european";
pub const VERSION_SYMBOL: &[u8] = b"mcengine_abi_version";

pub const STATUS_OK: i32 = 0;
pub const STATUS_NULL_POINTER: i32 = 1;
pub const STATUS_INVALID_REQUEST: i32 = 2;
pub const STATUS_PANIC: i32 = 3;

pub const OPTION_KIND_CALL: u8 = 0;
pub const OPTION_KIND_PUT: u8 = 1;

/// Signature of the exported pricing entry point.
pub type KernelFn = unsafe extern "C" fn(*const KernelRequest, *mut KernelResponse) -> i32;
/// Signature of the exported ABI version query.
pub type VersionFn = unsafe extern "C" fn() -> u32;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelRequest {
    pub spot: f64,
    pub rate: f64,
    pub vol: f64,
    pub strike: f64,
    pub maturity: f64,
    pub n_paths: u64,
    pub seed: u64,
    pub option_kind: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KernelResponse {
    pub price: f64,
    pub std_error: f64,
    pub n_paths: u64,
}

pub fn encode_request(
    model: &GbmModel,
    option: &EuropeanOption,
    config: &RunConfig,
    seed: u64,
) -> KernelRequest {
    KernelRequest {
        spot: model.spot(),
        rate: model.rate(),
        vol: model.vol(),
        strike: option.strike(),
        maturity: option.maturity(),
        n_paths: config.n_paths as u64,
        seed,
        option_kind: match option.option_type() {
            OptionType::Call => OPTION_KIND_CALL,
            OptionType::Put => OPTION_KIND_PUT,
        },
    }
}

impl KernelRequest {
    pub fn is_call(&self) -> bool {
        self.option_kind == OPTION_KIND_CALL
    }

    /// Checks the invariants a kernel relies on; the executor never sends a
    /// request that fails this, but a foreign caller might.
    pub fn validate(&self) -> Result<(), PricingError> {
        GbmModel::new(self.spot, self.rate, self.vol)?;
        EuropeanOption::call(self.strike, self.maturity)?;
        if self.n_paths < 1 {
            return Err(PricingError::InvalidConfiguration(
                "n_paths must be >= 1".to_string(),
            ));
        }
        if self.option_kind > OPTION_KIND_PUT {
            return Err(PricingError::invalid_parameter(
                "option_kind",
                format!("unknown kind {}", self.option_kind),
            ));
        }
        Ok(())
    }
}
