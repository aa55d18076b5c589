//! # hotel-auth
//!
//! Adapter for the external identity provider. Tokens are issued
//! elsewhere; this crate only validates them and answers "who is calling".
//!
//! ## Modules
//!
//! - `jwt`: bearer token claims and validation
//! - `requester`: the caller identity handed to the engine

pub mod jwt;
pub mod requester;

pub use jwt::{Claims, JwtDecoder};
pub use requester::Requester;
