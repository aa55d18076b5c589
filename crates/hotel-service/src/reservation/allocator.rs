//! Reservation allocator.
//!
//! Picks the best free resource for a request and claims it. The claim
//! itself is atomic in the store (`ReservationStore::insert` re-checks
//! overlap under lock), so the index result is only a ranked list of
//! candidates: losing a race on one candidate moves on to the next, and
//! the call fails with `Conflict` only once every candidate is taken.

use std::sync::Arc;

use tracing::{debug, info, warn};

use hotel_core::config::BookingConfig;
use hotel_core::error::{AppError, ErrorKind};
use hotel_core::result::AppResult;
use hotel_core::types::{BookingWindow, ResourceClassId};
use hotel_database::store::{CatalogGateway, ReservationStore, Stored};
use hotel_entity::catalog::{ResourceClass, ResourceKind};
use hotel_entity::reservation::{NewReservation, Reservation};

use crate::availability::index::within_operating_hours;
use crate::availability::{AvailabilityIndex, AvailabilityQuery};
use crate::context::RequestContext;
use crate::input;

/// Request to claim a resource.
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    /// Claim a resource of this class.
    pub class_id: Option<ResourceClassId>,
    /// Claim any resource of this kind. Must match the class when both
    /// are given.
    pub kind: Option<ResourceKind>,
    /// Requested window.
    pub window: BookingWindow,
    /// Number of guests.
    pub party_size: u32,
    /// Special requests.
    pub notes: Option<String>,
    /// Caller-supplied retry token.
    pub idempotency_key: Option<String>,
}

/// Claims resources for windows.
#[derive(Debug, Clone)]
pub struct ReservationAllocator {
    /// Catalog gateway.
    pub(crate) catalog: Arc<dyn CatalogGateway>,
    /// Reservation store.
    pub(crate) reservations: Arc<dyn ReservationStore>,
    /// Candidate search.
    pub(crate) index: Arc<AvailabilityIndex>,
    /// Booking limits and hotel clock.
    pub(crate) config: BookingConfig,
}

impl ReservationAllocator {
    /// Creates a new allocator.
    pub fn new(
        catalog: Arc<dyn CatalogGateway>,
        reservations: Arc<dyn ReservationStore>,
        index: Arc<AvailabilityIndex>,
        config: BookingConfig,
    ) -> Self {
        Self {
            catalog,
            reservations,
            index,
            config,
        }
    }

    /// Claim a resource for the requester.
    ///
    /// On success the reservation is `pending` with its total priced at
    /// this instant. A repeated call carrying the same idempotency key
    /// returns the first reservation as [`Stored::Replayed`] and claims
    /// nothing new.
    pub async fn allocate(
        &self,
        ctx: &RequestContext,
        req: AllocationRequest,
    ) -> AppResult<Stored<Reservation>> {
        let requester_id = ctx.requester_id()?;
        let notes = input::notes(req.notes)?;
        let idempotency_key = input::idempotency_key(req.idempotency_key)?;

        if let Some(key) = idempotency_key.as_deref() {
            if let Some(existing) = self
                .reservations
                .find_by_idempotency_key(requester_id, key)
                .await?
            {
                info!(
                    requester_id = %requester_id,
                    reservation_id = %existing.id,
                    "Reservation request replayed"
                );
                return Ok(Stored::Replayed(existing));
            }
        }

        let kind = match req.class_id {
            Some(class_id) => {
                let class = self.catalog.get_resource_class(class_id).await?;
                Self::check_class(&class, &req.window, req.party_size, req.kind)?;
                Some(class.kind)
            }
            None => req.kind,
        };

        let query = AvailabilityQuery {
            kind,
            class_id: req.class_id,
            window: req.window,
            party_size: req.party_size,
        };
        let candidates = self.index.find_available(ctx, &query).await?;
        if candidates.is_empty() {
            info!(
                requester_id = %requester_id,
                window = %req.window,
                party_size = req.party_size,
                "No availability for allocation"
            );
            return Err(no_availability(&req.window));
        }

        for candidate in &candidates {
            let new = NewReservation {
                resource_id: candidate.resource_id,
                class_id: candidate.class_id,
                resource_kind: candidate.kind,
                requester_id,
                window: req.window,
                party_size: req.party_size,
                total: candidate.total,
                notes: notes.clone(),
                idempotency_key: idempotency_key.clone(),
            };
            match self.reservations.insert(new).await {
                Ok(Stored::Created(reservation)) => {
                    info!(
                        requester_id = %requester_id,
                        reservation_id = %reservation.id,
                        resource_id = %reservation.resource_id,
                        window = %reservation.window,
                        total = %reservation.total,
                        "Reservation created"
                    );
                    return Ok(Stored::Created(reservation));
                }
                Ok(Stored::Replayed(reservation)) => {
                    info!(
                        requester_id = %requester_id,
                        reservation_id = %reservation.id,
                        "Reservation request replayed"
                    );
                    return Ok(Stored::Replayed(reservation));
                }
                Err(e) if e.kind == ErrorKind::Conflict => {
                    debug!(
                        resource_id = %candidate.resource_id,
                        reason = %e.message,
                        "Candidate taken, trying next"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            requester_id = %requester_id,
            window = %req.window,
            candidates = candidates.len(),
            "Allocation lost every candidate to concurrent bookings"
        );
        Err(no_availability(&req.window))
    }

    /// Explicit-class checks. Unlike a search, which skips ineligible
    /// classes, naming one the guest cannot use is a validation error.
    fn check_class(
        class: &ResourceClass,
        window: &BookingWindow,
        party_size: u32,
        kind: Option<ResourceKind>,
    ) -> AppResult<()> {
        if !class.status.is_bookable() {
            return Err(AppError::not_found(format!(
                "{} is not currently offered",
                class.name
            )));
        }
        if let Some(kind) = kind {
            if kind != class.kind {
                return Err(AppError::validation(format!(
                    "{} is not a {}",
                    class.name,
                    kind.as_str()
                ))
                .with_field("kind"));
            }
        }
        if !class.fits(party_size) {
            return Err(AppError::validation(format!(
                "{} holds at most {} guests, {party_size} requested",
                class.name, class.capacity
            ))
            .with_field("party_size")
            .with_details(serde_json::json!({ "capacity": class.capacity })));
        }
        if !within_operating_hours(class, window) {
            return Err(
                AppError::validation(format!("{} is closed during {window}", class.name))
                    .with_field("window"),
            );
        }
        Ok(())
    }
}

fn no_availability(window: &BookingWindow) -> AppError {
    AppError::conflict(format!("Nothing is available for {window}")).with_details(
        serde_json::json!({
            "start": window.start(),
            "end": window.end(),
        }),
    )
}
