//! # hotel-entity
//!
//! Domain entity models for the booking engine. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally implement `sqlx::FromRow`.

pub mod catalog;
pub mod lifecycle;
pub mod order;
pub mod reservation;

pub use lifecycle::LifecycleStatus;
