//! # Utilities Module
//!
//! Unit conversion and logging helpers shared by the editor modules.

pub mod logger;
pub mod units;

pub use logger::{setup_logger, LogConfig};
pub use units::{
    format_gwei, format_units_exact, parse_decimal, parse_gas_limit, parse_gwei, render_fiat,
    render_from_wei, FiatRate,
};
