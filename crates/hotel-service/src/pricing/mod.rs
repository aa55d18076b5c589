//! Pricing of stays, leisure slots and cart lines.

pub mod calculator;

pub use calculator::{PriceBasis, PricingCalculator, Quote};
