//! PostgreSQL implementations of the storage traits.

pub mod catalog;
pub mod order;
pub mod reservation;

pub use catalog::CatalogRepository;
pub use order::OrderRepository;
pub use reservation::ReservationRepository;
