//! Closed-form Black–Scholes prices, used as the oracle for both Monte Carlo
//! engines.

use std::f64::consts::{FRAC_2_SQRT_PI, PI, SQRT_2};

use crate::model::GbmModel;
use crate::product::{EuropeanOption, OptionType};

const ERF_SERIES_CUTOFF: f64 = 3.0;
const ERF_SATURATION: f64 = 6.0;
const ERFC_CF_DEPTH: u32 = 60;
const ERF_MAX_TERMS: u32 = 200;

/// Error function, accurate to a few ulps over the real line.
///
/// Uses the everywhere-positive Taylor form below `|x| = 3` and Laplace's
/// continued fraction for `erfc` above it.
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let ax = x.abs();
    let value = if ax == 0.0 {
        0.0
    } else if ax < ERF_SERIES_CUTOFF {
        erf_series(ax)
    } else if ax < ERF_SATURATION {
        1.0 - erfc_continued_fraction(ax)
    } else {
        1.0
    };
    if x < 0.0 {
        -value
    } else {
        value
    }
}

// erf(x) = 2/√π · e^{-x²} · Σ 2ⁿ x^{2n+1} / (1·3·…·(2n+1))
fn erf_series(x: f64) -> f64 {
    let x2 = x * x;
    let mut term = x;
    let mut sum = x;
    for n in 1..ERF_MAX_TERMS {
        term *= 2.0 * x2 / (2 * n + 1) as f64;
        sum += term;
        if term < sum * f64::EPSILON {
            break;
        }
    }
    FRAC_2_SQRT_PI * (-x2).exp() * sum
}

// erfc(x) = e^{-x²}/√π · 1 / (x + ½/(x + 1/(x + 3/2/(x + …))))
fn erfc_continued_fraction(x: f64) -> f64 {
    let mut f = x;
    for k in (1..=ERFC_CF_DEPTH).rev() {
        f = x + (k as f64 * 0.5) / f;
    }
    (-x * x).exp() / (PI.sqrt() * f)
}

/// Standard normal CDF, `Φ(x) = ½(1 + erf(x/√2))`.
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// Black–Scholes price of a European option on a non-dividend-paying asset.
///
/// At `maturity == 0` this is the intrinsic payoff at spot. With zero
/// volatility it is the deterministic limit `max(S₀ − K e^{−rT}, 0)` for a
/// call and `max(K e^{−rT} − S₀, 0)` for a put.
pub fn black_scholes_price(model: &GbmModel, option: &EuropeanOption) -> f64 {
    let s0 = model.spot();
    let k = option.strike();
    let t = option.maturity();
    let r = model.rate();
    let sigma = model.vol();

    if t == 0.0 {
        return option.payoff_at(s0);
    }

    let disc_strike = k * (-r * t).exp();
    let vol_sqrt_t = sigma * t.sqrt();
    if vol_sqrt_t == 0.0 {
        return match option.option_type() {
            OptionType::Call => (s0 - disc_strike).max(0.0),
            OptionType::Put => (disc_strike - s0).max(0.0),
        };
    }

    let d1 = ((s0 / k).ln() + (r + 0.5 * sigma * sigma) * t) / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;

    match option.option_type() {
        OptionType::Call => s0 * norm_cdf(d1) - disc_strike * norm_cdf(d2),
        OptionType::Put => disc_strike * norm_cdf(-d2) - s0 * norm_cdf(-d1),
    }
}
