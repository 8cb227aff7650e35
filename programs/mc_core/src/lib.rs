//! Streaming Monte Carlo kernel for European options under GBM.
//!
//! Built both as an `rlib` (linked straight into the executor) and as a
//! `cdylib` exporting the kernel ABI for runtime loading. Paths are cut into
//! fixed-size chunks, each with its own PCG stream, so the result is a
//! function of the request and seed alone, whatever the thread count.

use std::panic::{catch_unwind, AssertUnwindSafe};

use mcengine_shared::abi::{
    KernelRequest, KernelResponse, KERNEL_ABI_VERSION, STATUS_INVALID_REQUEST,
    STATUS_NULL_POINTER, STATUS_OK, STATUS_PANIC,
};
use mcengine_shared::stats::RunningStats;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg64;
use rayon::prelude::*;

pub const CHUNK_PATHS: u64 = 16_384;

#[inline]
fn mix(mut z: u64) -> u64 {
    z ^= z >> 30;
    z = z.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z ^= z >> 27;
    z = z.wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[inline]
fn chunk_rng(seed: u64, chunk: u64) -> Pcg64 {
    Pcg64::seed_from_u64(mix(seed ^ mix(chunk.wrapping_add(0x9e37_79b9_7f4a_7c15))))
}

struct PathTerms {
    spot: f64,
    strike: f64,
    drift: f64,
    diffusion: f64,
    discount: f64,
    is_call: bool,
}

impl PathTerms {
    fn new(req: &KernelRequest) -> Self {
        let t = req.maturity;
        Self {
            spot: req.spot,
            strike: req.strike,
            drift: (req.rate - 0.5 * req.vol * req.vol) * t,
            diffusion: req.vol * t.sqrt(),
            discount: (-req.rate * t).exp(),
            is_call: req.is_call(),
        }
    }

    #[inline]
    fn discounted_payoff(&self, z: f64) -> f64 {
        let st = self.spot * (self.drift + self.diffusion * z).exp();
        let payoff = if self.is_call {
            (st - self.strike).max(0.0)
        } else {
            (self.strike - st).max(0.0)
        };
        self.discount * payoff
    }
}

fn run_chunk(terms: &PathTerms, seed: u64, chunk: u64, n: u64) -> RunningStats {
    let mut rng = chunk_rng(seed, chunk);
    let mut stats = RunningStats::new();
    for _ in 0..n {
        let z: f64 = rng.sample(StandardNormal);
        stats.push(terms.discounted_payoff(z));
    }
    stats
}

/// Prices a validated request. Callers outside the executor should go
/// through [`mcengine_price_european`], which validates first.
pub fn price_european(req: &KernelRequest) -> KernelResponse {
    let terms = PathTerms::new(req);

    // No randomness to consume: every path lands on the same price.
    if req.maturity == 0.0 || req.vol == 0.0 {
        let value = terms.discounted_payoff(0.0);
        return KernelResponse {
            price: value,
            std_error: 0.0,
            n_paths: req.n_paths,
        };
    }

    let n_chunks = req.n_paths.div_ceil(CHUNK_PATHS);
    let partials: Vec<RunningStats> = (0..n_chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * CHUNK_PATHS;
            let len = CHUNK_PATHS.min(req.n_paths - start);
            run_chunk(&terms, req.seed, chunk, len)
        })
        .collect();

    let stats = partials
        .iter()
        .fold(RunningStats::new(), |acc, p| acc.merged(*p));

    KernelResponse {
        price: stats.mean(),
        std_error: stats.std_error(),
        n_paths: stats.count(),
    }
}

#[no_mangle]
pub extern "C" fn mcengine_abi_version() -> u32 {
    KERNEL_ABI_VERSION
}

/// # Safety
///
/// `req` must point to a readable `KernelRequest` and `out` to a writable
/// `KernelResponse`; either may be null, which is reported as a status code.
#[no_mangle]
pub unsafe extern "C" fn mcengine_price_european(
    req: *const KernelRequest,
    out: *mut KernelResponse,
) -> i32 {
    if req.is_null() || out.is_null() {
        return STATUS_NULL_POINTER;
    }
    let req = unsafe { *req };
    if req.validate().is_err() {
        return STATUS_INVALID_REQUEST;
    }
    match catch_unwind(AssertUnwindSafe(|| price_european(&req))) {
        Ok(response) => {
            unsafe { out.write(response) };
            STATUS_OK
        }
        Err(_) => STATUS_PANIC,
    }
}
