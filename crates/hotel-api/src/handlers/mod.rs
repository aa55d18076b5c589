//! Route handlers organized by domain.

pub mod availability;
pub mod health;
pub mod order;
pub mod reservation;
