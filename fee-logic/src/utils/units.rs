//! # Fee Logic - Unit Parsing & Formatting
//!
//! Converts user-entered decimal strings into exact base units and back.
//! Everything here is integer arithmetic on [`U256`]; the only floating point
//! is the fiat estimate, which is display-only.

use crate::error::ParseError;
use ethers::types::U256;
use ethers::utils::format_units;
use serde::{Deserialize, Serialize};

pub const WEI_DECIMALS: u32 = 0;
pub const GWEI_DECIMALS: u32 = 9;
pub const ETHER_DECIMALS: u32 = 18;

/// Fraction digits shown when rendering an ether amount
pub const RENDER_DECIMALS: u32 = 5;

/// Conversion rate from ether to a fiat currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiatRate {
    pub rate: f64,
    pub currency: String,
}

impl FiatRate {
    pub fn new(rate: f64, currency: impl Into<String>) -> Self {
        Self {
            rate,
            currency: currency.into(),
        }
    }
}

/// Removes whitespace and ASCII letters and accepts `,` as the decimal point.
pub fn sanitize_decimal(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_ascii_alphabetic())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Strict `^\d+$|^\d+\.\d+$` check.
pub fn is_decimal(s: &str) -> bool {
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match s.split_once('.') {
        None => all_digits(s),
        Some((int, frac)) => all_digits(int) && all_digits(frac),
    }
}

/// Parses a human-unit decimal into base units with `decimals` fraction digits.
///
/// The input is sanitized first. Fractions finer than one base unit are
/// rejected rather than truncated.
pub fn parse_decimal(input: &str, decimals: u32) -> Result<U256, ParseError> {
    let cleaned = sanitize_decimal(input);
    if !is_decimal(&cleaned) {
        return Err(ParseError::InvalidFormat {
            input: input.to_string(),
        });
    }

    let (int_part, frac_part) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.len() > decimals as usize {
        return Err(ParseError::ExcessPrecision {
            input: input.to_string(),
            decimals,
        });
    }

    let overflow = || ParseError::Overflow {
        input: input.to_string(),
    };

    let scale = U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .ok_or_else(overflow)?;
    let whole = U256::from_dec_str(int_part).map_err(|_| overflow())?;

    let fraction = if frac_part.is_empty() {
        U256::zero()
    } else {
        let padded = format!("{:0<width$}", frac_part, width = decimals as usize);
        U256::from_dec_str(&padded).map_err(|_| overflow())?
    };

    whole
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction))
        .ok_or_else(overflow)
}

/// Gas price typed in gwei, returned in wei.
pub fn parse_gwei(input: &str) -> Result<U256, ParseError> {
    parse_decimal(input, GWEI_DECIMALS)
}

/// Gas limit typed as a plain integer.
pub fn parse_gas_limit(input: &str) -> Result<U256, ParseError> {
    parse_decimal(input, WEI_DECIMALS)
}

/// Renders base units as a trimmed decimal string, without loss.
pub fn format_units_exact(amount: U256, decimals: u32) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    // past 10^77 every U256 amount is a pure fraction
    let (whole, fraction) = match U256::from(10u64).checked_pow(U256::from(decimals)) {
        Some(scale) => (amount / scale, amount % scale),
        None => (U256::zero(), amount),
    };
    if fraction.is_zero() {
        return whole.to_string();
    }
    let digits = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Wei rendered in gwei, as shown in the gas price field.
pub fn format_gwei(wei: U256) -> String {
    format_units_exact(wei, GWEI_DECIMALS)
}

/// Ether amount for display, rounded half-up to [`RENDER_DECIMALS`] digits.
pub fn render_from_wei(wei: U256) -> String {
    let step = U256::exp10((ETHER_DECIMALS - RENDER_DECIMALS) as usize);
    let half = step / 2;
    let rounded = match wei.checked_add(half) {
        Some(v) => v / step,
        None => wei / step,
    };
    format_units_exact(rounded, RENDER_DECIMALS)
}

/// `gas_limit * gas_price` in wei, `None` on overflow.
pub fn total_fee(gas_limit: U256, gas_price: U256) -> Option<U256> {
    gas_limit.checked_mul(gas_price)
}

/// Fiat value of a wei amount, e.g. `"12.34 USD"`.
pub fn render_fiat(wei: U256, fiat: &FiatRate) -> String {
    let ether = format_units(wei, ETHER_DECIMALS)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let value = (ether * fiat.rate * 100.0).round() / 100.0;
    format!("{:.2} {}", value, fiat.currency.to_uppercase())
}
