//! # hotel-database
//!
//! PostgreSQL connection management, the storage seams used by the booking
//! engine, and two implementations of them: PostgreSQL repositories and an
//! in-process memory store.

pub mod connection;
pub mod error;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{
    CatalogGateway, OrderStore, ReservationStore, ResourceFilter, ResourceWithClass, Stored,
};
