//! Catalog entities: bookable resource classes, concrete resources, and
//! purchasable items. Read-only for the engine.

pub mod class;
pub mod item;
pub mod metadata;
pub mod resource;

pub use class::{ClassStatus, ResourceClass, ResourceClassRow, ResourceKind};
pub use item::CatalogItem;
pub use metadata::{ClassMetadata, OperatingHours};
pub use resource::{Resource, ResourceStatus};
