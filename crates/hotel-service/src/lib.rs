//! # hotel-service
//!
//! The booking engine. Each service orchestrates the storage traits from
//! `hotel-database` to implement one use case:
//!
//! - `availability`: which resources are free for a window
//! - `pricing`: totals for stays and slots, drink-line quantity bounds
//! - `reservation`: race-safe allocation and requester history
//! - `checkout`: folding a cart into one priced order
//! - `lifecycle`: cancellation and confirmation
//!
//! Services follow constructor injection; all dependencies are provided
//! at construction time via `Arc` references.

pub mod availability;
pub mod checkout;
pub mod context;
mod input;
pub mod lifecycle;
pub mod pricing;
pub mod reservation;

#[cfg(test)]
mod fixtures;

pub use availability::{AvailabilityIndex, AvailabilityQuery, AvailableResource};
pub use checkout::{CheckoutRequest, CheckoutResult, OrderAggregator};
pub use context::RequestContext;
pub use lifecycle::LifecycleService;
pub use pricing::{PriceBasis, PricingCalculator, Quote};
pub use reservation::{AllocationRequest, ReservationAllocator, ReservationView};
