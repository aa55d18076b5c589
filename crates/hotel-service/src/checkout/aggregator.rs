//! Order aggregator.
//!
//! Every cart line is re-validated against current state. Lines that
//! fail are left out of the order and reported with their position and
//! reason; storage failures abort the whole checkout instead. Prices come
//! from the catalog (drinks) or the reservation's own total, never from
//! the cart.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use hotel_core::config::BookingConfig;
use hotel_core::error::{AppError, ErrorKind};
use hotel_core::result::AppResult;
use hotel_core::types::money;
use hotel_core::types::{
    CatalogItemId, OrderId, PageRequest, PageResponse, ReservationId, UserId,
};
use hotel_database::store::{CatalogGateway, OrderStore, ReservationStore, Stored};
use hotel_entity::LifecycleStatus;
use hotel_entity::catalog::ResourceKind;
use hotel_entity::order::{
    CartLine, CartLineKind, NewOrder, NewOrderLine, Order, OrderWithLines, RejectedLine,
};

use crate::context::RequestContext;
use crate::input;
use crate::pricing::PricingCalculator;

/// Longest accepted table number.
const MAX_TABLE_NUMBER_LEN: usize = 16;

/// A cart submitted for checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Cart lines in display order.
    pub lines: Vec<CartLine>,
    /// Bar table, if served at one.
    pub table_number: Option<String>,
    /// Notes for the bar.
    pub notes: Option<String>,
    /// Caller-supplied retry token.
    pub idempotency_key: Option<String>,
}

/// Outcome of a checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResult {
    /// The persisted order.
    pub order: OrderWithLines,
    /// Lines left out, in cart order.
    pub rejected_lines: Vec<RejectedLine>,
    /// Whether this was a retry of an earlier checkout.
    pub replayed: bool,
}

/// A line that passed validation, with its cart position.
struct AcceptedLine {
    index: usize,
    cart: CartLine,
    line: NewOrderLine,
}

/// Turns carts into orders.
#[derive(Debug, Clone)]
pub struct OrderAggregator {
    /// Catalog gateway.
    catalog: Arc<dyn CatalogGateway>,
    /// Reservation store.
    reservations: Arc<dyn ReservationStore>,
    /// Order store.
    orders: Arc<dyn OrderStore>,
    /// Pricing calculator.
    pricing: PricingCalculator,
    /// Cart limits.
    config: BookingConfig,
}

impl OrderAggregator {
    /// Creates a new order aggregator.
    pub fn new(
        catalog: Arc<dyn CatalogGateway>,
        reservations: Arc<dyn ReservationStore>,
        orders: Arc<dyn OrderStore>,
        config: BookingConfig,
    ) -> Self {
        Self {
            catalog,
            reservations,
            orders,
            pricing: PricingCalculator::new(&config),
            config,
        }
    }

    /// Validate the cart and persist one order for the lines that pass.
    ///
    /// Fails with `Validation` ("empty order") when no line passes; the
    /// error details list every rejected line.
    pub async fn checkout(
        &self,
        ctx: &RequestContext,
        req: CheckoutRequest,
    ) -> AppResult<CheckoutResult> {
        let requester_id = ctx.requester_id()?;
        let notes = input::notes(req.notes)?;
        let table_number = table_number(req.table_number)?;
        let idempotency_key = input::idempotency_key(req.idempotency_key)?;

        if req.lines.is_empty() {
            return Err(AppError::validation("Empty order: the cart has no lines").with_field("lines"));
        }
        if req.lines.len() > self.config.max_cart_lines {
            return Err(AppError::validation(format!(
                "A cart holds at most {} lines",
                self.config.max_cart_lines
            ))
            .with_field("lines"));
        }

        if let Some(key) = idempotency_key.as_deref() {
            if let Some(existing) = self.orders.find_by_idempotency_key(requester_id, key).await? {
                info!(
                    requester_id = %requester_id,
                    order_id = %existing.order.id,
                    "Checkout replayed"
                );
                return Ok(CheckoutResult {
                    order: existing,
                    rejected_lines: Vec::new(),
                    replayed: true,
                });
            }
        }

        let mut accepted = Vec::with_capacity(req.lines.len());
        let mut rejected = Vec::new();
        let mut seen_reservations = HashSet::new();
        for (index, cart) in req.lines.into_iter().enumerate() {
            let resolved = match cart.kind {
                CartLineKind::Drink => self.drink_line(&cart).await,
                CartLineKind::Reservation => {
                    self.reservation_line(requester_id, &cart, &mut seen_reservations)
                        .await
                }
            };
            match resolved {
                Ok(line) => accepted.push(AcceptedLine { index, cart, line }),
                Err(e) if is_line_error(&e) => rejected.push(reject(index, &cart, &e)),
                Err(e) => return Err(e),
            }
        }

        let reservation_ids: Vec<ReservationId> =
            accepted.iter().filter_map(|a| a.line.reservation_id).collect();
        if !reservation_ids.is_empty() {
            let billed: HashSet<ReservationId> = self
                .orders
                .billed_reservations(&reservation_ids)
                .await?
                .into_iter()
                .collect();
            accepted.retain(|a| match a.line.reservation_id {
                Some(id) if billed.contains(&id) => {
                    let err = AppError::conflict(format!(
                        "Reservation {id} is already billed by another order"
                    ));
                    rejected.push(reject(a.index, &a.cart, &err));
                    false
                }
                _ => true,
            });
        }
        rejected.sort_by_key(|r| r.index);

        if accepted.is_empty() {
            warn!(
                requester_id = %requester_id,
                rejected = rejected.len(),
                "Checkout rejected every line"
            );
            return Err(
                AppError::validation("Empty order: no cart line could be accepted")
                    .with_field("lines")
                    .with_details(serde_json::json!({ "rejected_lines": rejected })),
            );
        }

        let lines: Vec<NewOrderLine> = accepted.into_iter().map(|a| a.line).collect();
        let new = NewOrder {
            requester_id,
            lines,
            table_number,
            notes,
            idempotency_key,
        };
        let total = new.total();
        if !money::is_storable(total) {
            return Err(AppError::validation("Order total is too large").with_field("lines"));
        }

        match self.orders.insert(new).await? {
            Stored::Created(order) => {
                info!(
                    requester_id = %requester_id,
                    order_id = %order.order.id,
                    total = %total,
                    line_count = order.lines.len(),
                    rejected = rejected.len(),
                    "Order created"
                );
                Ok(CheckoutResult {
                    order,
                    rejected_lines: rejected,
                    replayed: false,
                })
            }
            Stored::Replayed(order) => {
                info!(
                    requester_id = %requester_id,
                    order_id = %order.order.id,
                    "Checkout replayed"
                );
                Ok(CheckoutResult {
                    order,
                    rejected_lines: Vec::new(),
                    replayed: true,
                })
            }
        }
    }

    async fn drink_line(&self, cart: &CartLine) -> AppResult<NewOrderLine> {
        let quantity = self.pricing.quantity(cart.quantity)?;
        let item = self
            .catalog
            .get_catalog_item(CatalogItemId::from_uuid(cart.ref_id))
            .await?;
        if !item.available {
            return Err(AppError::not_found(format!(
                "{} is not available right now",
                item.name
            )));
        }
        let line = NewOrderLine::drink(item.id, item.name, quantity, item.price);
        if !money::is_storable(line.line_total()) {
            return Err(AppError::validation("Line total is too large").with_field("quantity"));
        }
        Ok(line)
    }

    async fn reservation_line(
        &self,
        requester_id: UserId,
        cart: &CartLine,
        seen: &mut HashSet<ReservationId>,
    ) -> AppResult<NewOrderLine> {
        if cart.quantity.is_some_and(|q| q != 1) {
            return Err(
                AppError::validation("A reservation is billed exactly once").with_field("quantity"),
            );
        }
        let id = ReservationId::from_uuid(cart.ref_id);
        if !seen.insert(id) {
            return Err(AppError::validation(format!(
                "Reservation {id} appears more than once in the cart"
            )));
        }
        let reservation = self
            .reservations
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {id} not found")))?;
        if !reservation.is_owned_by(requester_id) {
            return Err(AppError::authorization(
                "This reservation belongs to another guest",
            ));
        }
        if reservation.status != LifecycleStatus::Pending {
            return Err(AppError::conflict(format!(
                "Reservation {id} is {} and can no longer be billed",
                reservation.status
            )));
        }

        let resource = self.catalog.get_resource(reservation.resource_id).await?;
        let label = match reservation.resource_kind {
            ResourceKind::Room => "Room",
            ResourceKind::LeisureArea => "Leisure area",
        };
        let description = format!("{label} {} for {}", resource.identifier, reservation.window);
        Ok(NewOrderLine::reservation(id, description, reservation.total))
    }

    /// The requester's orders, newest first.
    pub async fn list_orders(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<Order>> {
        let requester_id = ctx.requester_id()?;
        let (items, total) = self.orders.list_by_requester(requester_id, &page).await?;
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    /// One of the requester's orders with its lines.
    pub async fn get_order(&self, ctx: &RequestContext, id: OrderId) -> AppResult<OrderWithLines> {
        let requester_id = ctx.requester_id()?;
        let order = self
            .orders
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
        if !order.order.is_owned_by(requester_id) {
            return Err(AppError::authorization("This order belongs to another guest"));
        }
        Ok(order)
    }
}

/// Errors that exclude a single line rather than the whole checkout.
fn is_line_error(err: &AppError) -> bool {
    matches!(
        err.kind,
        ErrorKind::Validation | ErrorKind::NotFound | ErrorKind::Authorization | ErrorKind::Conflict
    )
}

fn reject(index: usize, cart: &CartLine, err: &AppError) -> RejectedLine {
    RejectedLine {
        index,
        kind: cart.kind,
        ref_id: cart.ref_id,
        reason: err.kind,
        message: err.message.clone(),
    }
}

fn table_number(table: Option<String>) -> AppResult<Option<String>> {
    let Some(table) = table else {
        return Ok(None);
    };
    let table = table.trim();
    if table.is_empty() {
        return Ok(None);
    }
    if table.chars().count() > MAX_TABLE_NUMBER_LEN {
        return Err(AppError::validation(format!(
            "Table number is limited to {MAX_TABLE_NUMBER_LEN} characters"
        ))
        .with_field("table_number"));
    }
    Ok(Some(table.to_string()))
}
