//! Availability index: which resources are free for a window.

pub mod index;

pub use index::{AvailabilityIndex, AvailabilityQuery, AvailableResource};
