//! Checkout: folding a cart into one priced order.

pub mod aggregator;

pub use aggregator::{CheckoutRequest, CheckoutResult, OrderAggregator};
