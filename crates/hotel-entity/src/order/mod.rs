//! Order domain entities: headers, lines, and the cart value passed to
//! checkout.

pub mod cart;
pub mod line;
pub mod model;

pub use cart::{CartLine, CartLineKind, RejectedLine};
pub use line::{NewOrderLine, OrderLine, OrderLineKind};
pub use model::{NewOrder, Order, OrderWithLines};
