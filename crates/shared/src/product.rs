use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PricingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => f.write_str("call"),
            OptionType::Put => f.write_str("put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(format!("unknown option type `{other}` (expected `call` or `put`)")),
        }
    }
}

/// Where a terminal price leaves the holder at expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Moneyness {
    InTheMoney,
    AtTheMoney,
    OutOfTheMoney,
}

/// Cash-settled European option on a single underlying.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EuropeanOption {
    strike: f64,
    maturity: f64,
    option_type: OptionType,
}

impl EuropeanOption {
    pub fn new(strike: f64, maturity: f64, option_type: OptionType) -> Result<Self, PricingError> {
        if !strike.is_finite() || strike <= 0.0 {
            return Err(PricingError::invalid_parameter(
                "strike",
                format!("must be finite and > 0, got {strike}"),
            ));
        }
        if !maturity.is_finite() || maturity < 0.0 {
            return Err(PricingError::invalid_parameter(
                "maturity",
                format!("must be finite and >= 0, got {maturity}"),
            ));
        }
        Ok(Self {
            strike,
            maturity,
            option_type,
        })
    }

    pub fn call(strike: f64, maturity: f64) -> Result<Self, PricingError> {
        Self::new(strike, maturity, OptionType::Call)
    }

    pub fn put(strike: f64, maturity: f64) -> Result<Self, PricingError> {
        Self::new(strike, maturity, OptionType::Put)
    }

    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    #[inline]
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Payoff for a single terminal price.
    #[inline]
    pub fn payoff_at(&self, terminal_price: f64) -> f64 {
        match self.option_type {
            OptionType::Call => (terminal_price - self.strike).max(0.0),
            OptionType::Put => (self.strike - terminal_price).max(0.0),
        }
    }

    /// Element-wise payoff over a batch of terminal prices.
    pub fn payoff(&self, terminal_prices: &[f64]) -> Vec<f64> {
        terminal_prices.iter().map(|&s| self.payoff_at(s)).collect()
    }

    pub fn moneyness(&self, terminal_price: f64) -> Moneyness {
        let signed = match self.option_type {
            OptionType::Call => terminal_price - self.strike,
            OptionType::Put => self.strike - terminal_price,
        };
        if signed > 0.0 {
            Moneyness::InTheMoney
        } else if signed == 0.0 {
            Moneyness::AtTheMoney
        } else {
            Moneyness::OutOfTheMoney
        }
    }
}
