//! Reservation allocation and requester history.

pub mod allocator;
pub mod history;

pub use allocator::{AllocationRequest, ReservationAllocator};
pub use history::ReservationView;
