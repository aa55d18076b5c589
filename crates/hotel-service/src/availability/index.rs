//! Availability index service.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::debug;

use hotel_core::config::BookingConfig;
use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::{
    BookingWindow, Money, ResourceClassId, ResourceId, WindowGranularity,
};
use hotel_database::store::{CatalogGateway, ReservationStore, ResourceFilter, ResourceWithClass};
use hotel_entity::catalog::{ResourceClass, ResourceKind};

use crate::context::RequestContext;
use crate::pricing::{PriceBasis, PricingCalculator, Quote};

/// Search parameters.
#[derive(Debug, Clone)]
pub struct AvailabilityQuery {
    /// Only this kind of resource.
    pub kind: Option<ResourceKind>,
    /// Only resources of this class.
    pub class_id: Option<ResourceClassId>,
    /// Requested window.
    pub window: BookingWindow,
    /// Number of guests, at least 1.
    pub party_size: u32,
}

/// One free resource with its price for the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableResource {
    /// The free resource.
    pub resource_id: ResourceId,
    /// Room number or area label.
    pub identifier: String,
    /// Its class.
    pub class_id: ResourceClassId,
    /// Class display name.
    pub class_name: String,
    /// Room or leisure area.
    pub kind: ResourceKind,
    /// Class capacity.
    pub capacity: u32,
    /// Nightly or flat price.
    pub unit_price: Money,
    /// Nights or flat.
    pub basis: PriceBasis,
    /// Amount a reservation would cost.
    pub total: Money,
}

impl AvailableResource {
    fn new(candidate: &ResourceWithClass, quote: Quote) -> Self {
        Self {
            resource_id: candidate.resource.id,
            identifier: candidate.resource.identifier.clone(),
            class_id: candidate.class.id,
            class_name: candidate.class.name.clone(),
            kind: candidate.class.kind,
            capacity: candidate.class.capacity,
            unit_price: quote.unit_price,
            basis: quote.basis,
            total: quote.total,
        }
    }

    /// The quote this entry was priced with.
    pub fn quote(&self) -> Quote {
        Quote {
            unit_price: self.unit_price,
            basis: self.basis,
            total: self.total,
        }
    }
}

/// Finds free resources for a window.
#[derive(Debug, Clone)]
pub struct AvailabilityIndex {
    /// Catalog gateway.
    catalog: Arc<dyn CatalogGateway>,
    /// Reservation store.
    reservations: Arc<dyn ReservationStore>,
    /// Pricing calculator.
    pricing: PricingCalculator,
    /// Booking limits.
    config: BookingConfig,
}

impl AvailabilityIndex {
    /// Creates a new availability index.
    pub fn new(
        catalog: Arc<dyn CatalogGateway>,
        reservations: Arc<dyn ReservationStore>,
        config: BookingConfig,
    ) -> Self {
        Self {
            catalog,
            reservations,
            pricing: PricingCalculator::new(&config),
            config,
        }
    }

    /// Free resources for the query, cheapest first, ties broken by
    /// identifier. An empty list is a valid answer.
    ///
    /// Malformed input fails with a validation error before any
    /// reservation is read.
    pub async fn find_available(
        &self,
        ctx: &RequestContext,
        query: &AvailabilityQuery,
    ) -> AppResult<Vec<AvailableResource>> {
        self.validate_shape(ctx, query)?;
        let kind = match (query.kind, query.class_id) {
            (Some(kind), _) => Some(kind),
            (None, Some(class_id)) => Some(self.catalog.get_resource_class(class_id).await?.kind),
            (None, None) => None,
        };
        self.validate(ctx, query, kind)?;

        let filter = ResourceFilter {
            kind: query.kind,
            class_id: query.class_id,
        };
        let candidates: Vec<ResourceWithClass> = self
            .catalog
            .list_resources(&filter)
            .await?
            .into_iter()
            .filter(|c| Self::admits(c, query))
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ResourceId> = candidates.iter().map(|c| c.resource.id).collect();
        let blocked: HashSet<ResourceId> = self
            .reservations
            .find_active_overlapping(&ids, &query.window)
            .await?
            .into_iter()
            .map(|r| r.resource_id)
            .collect();

        let mut free = Vec::with_capacity(candidates.len());
        for candidate in candidates
            .iter()
            .filter(|c| !blocked.contains(&c.resource.id))
        {
            let quote = self.pricing.price(&candidate.class, &query.window)?;
            free.push(AvailableResource::new(candidate, quote));
        }
        free.sort_by(|a, b| {
            a.unit_price
                .cmp(&b.unit_price)
                .then_with(|| a.identifier.cmp(&b.identifier))
                .then_with(|| a.resource_id.into_uuid().cmp(&b.resource_id.into_uuid()))
        });

        debug!(
            window = %query.window,
            party_size = query.party_size,
            candidates = ids.len(),
            blocked = blocked.len(),
            free = free.len(),
            "Availability computed"
        );
        Ok(free)
    }

    /// Checks that hold whatever the resource kind, run before the
    /// catalog is read. Date granularity is the loosest past check.
    fn validate_shape(&self, ctx: &RequestContext, query: &AvailabilityQuery) -> AppResult<()> {
        if query.party_size == 0 {
            return Err(
                AppError::validation("Party size must be at least 1").with_field("party_size")
            );
        }
        let now = ctx.local_now(&self.config);
        query.window.ensure_not_past(WindowGranularity::Date, now)?;
        query
            .window
            .ensure_within_horizon(now, self.config.max_advance_days)
    }

    /// Kind-specific window checks: past at the kind's granularity, and
    /// the stay limit for rooms.
    fn validate(
        &self,
        ctx: &RequestContext,
        query: &AvailabilityQuery,
        kind: Option<ResourceKind>,
    ) -> AppResult<()> {
        let now = ctx.local_now(&self.config);
        let granularity = match kind {
            Some(kind) => kind.granularity(),
            None => granularity_of(&query.window),
        };
        query.window.ensure_not_past(granularity, now)?;
        if granularity == WindowGranularity::Date {
            self.pricing.nights(&query.window)?;
        }
        Ok(())
    }

    /// Catalog-side eligibility of one candidate: both statuses offered,
    /// party fits, and leisure hours admit the window.
    fn admits(candidate: &ResourceWithClass, query: &AvailabilityQuery) -> bool {
        let class = &candidate.class;
        candidate.resource.is_bookable()
            && class.status.is_bookable()
            && class.fits(query.party_size)
            && within_operating_hours(class, &query.window)
    }
}

/// Whether a leisure class is open for the whole window. Rooms and areas
/// without published hours always are.
pub(crate) fn within_operating_hours(class: &ResourceClass, window: &BookingWindow) -> bool {
    match (class.kind, class.metadata.operating_hours) {
        (ResourceKind::LeisureArea, Some(hours)) => hours.admits(window),
        _ => true,
    }
}

/// Without a kind filter, a midnight-aligned window reads as a stay and
/// anything else as a slot.
fn granularity_of(window: &BookingWindow) -> WindowGranularity {
    let at_midnight = |t: NaiveDateTime| t.time() == NaiveTime::MIN;
    if at_midnight(window.start()) && at_midnight(window.end()) {
        WindowGranularity::Date
    } else {
        WindowGranularity::DateTime
    }
}
