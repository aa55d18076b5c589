//! Core type definitions used across the workspace.

pub mod id;
pub mod money;
pub mod pagination;
pub mod window;

pub use id::*;
pub use money::Money;
pub use pagination::{PageRequest, PageResponse};
pub use window::{BookingWindow, WindowGranularity};
