//! Reservation and order lifecycle transitions.

pub mod service;

pub use service::LifecycleService;
