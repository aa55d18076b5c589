//! Reservation repository implementation.
//!
//! Allocation is guarded twice: the target resource row is locked with
//! `FOR UPDATE` before the overlap check, and the `reservations_no_overlap`
//! exclusion constraint rejects any overlapping active row at insert time
//! (mapped to `Conflict` by [`crate::error::map_sqlx`]).

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::{BookingWindow, PageRequest, ReservationId, ResourceId, UserId};
use hotel_entity::LifecycleStatus;
use hotel_entity::reservation::{NewReservation, Reservation};

use crate::error::{billed_reservation, db_err};
use crate::store::{ReservationStore, Stored};

/// Repository for reservations.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Create a new reservation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_key_in(
        tx: &mut Transaction<'_, Postgres>,
        requester: UserId,
        key: &str,
    ) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE requester_id = $1 AND idempotency_key = $2",
        )
        .bind(requester)
        .bind(key)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err("Failed to find reservation by idempotency key"))
    }

    /// Lock the resource row and check it is still offered.
    async fn lock_resource(
        tx: &mut Transaction<'_, Postgres>,
        resource_id: ResourceId,
    ) -> AppResult<()> {
        let bookable: Option<bool> = sqlx::query_scalar(
            "SELECT (r.status = 'available' AND c.status = 'available') \
             FROM resources r JOIN resource_classes c ON c.id = r.class_id \
             WHERE r.id = $1 FOR UPDATE OF r",
        )
        .bind(resource_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err("Failed to lock resource"))?;

        match bookable {
            None => Err(AppError::not_found(format!("Resource {resource_id} not found"))),
            Some(false) => Err(AppError::conflict(format!(
                "Resource {resource_id} is no longer available"
            ))),
            Some(true) => Ok(()),
        }
    }
}

#[async_trait]
impl ReservationStore for ReservationRepository {
    async fn find_active_overlapping(
        &self,
        resource_ids: &[ResourceId],
        window: &BookingWindow,
    ) -> AppResult<Vec<Reservation>> {
        if resource_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations \
             WHERE resource_id = ANY($1) \
               AND status IN ('pending', 'confirmed') \
               AND window_start < $3 AND $2 < window_end",
        )
        .bind(resource_ids)
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to find overlapping reservations"))
    }

    async fn insert(&self, new: NewReservation) -> AppResult<Stored<Reservation>> {
        let party_size = i32::try_from(new.party_size).map_err(|_| {
            AppError::validation("Party size is out of range").with_field("party_size")
        })?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        Self::lock_resource(&mut tx, new.resource_id).await?;

        // A retry of the same call may have been serialized behind the
        // original on this lock.
        if let Some(key) = new.idempotency_key.as_deref() {
            if let Some(existing) = Self::find_by_key_in(&mut tx, new.requester_id, key).await? {
                return Ok(Stored::Replayed(existing));
            }
        }

        let overlapping: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations \
             WHERE resource_id = $1 \
               AND status IN ('pending', 'confirmed') \
               AND window_start < $3 AND $2 < window_end",
        )
        .bind(new.resource_id)
        .bind(new.window.start())
        .bind(new.window.end())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("Failed to check overlapping reservations"))?;

        if overlapping > 0 {
            debug!(resource_id = %new.resource_id, window = %new.window, "Overlap found under lock");
            return Err(AppError::conflict(format!(
                "Resource {} is already reserved for an overlapping window",
                new.resource_id
            )));
        }

        let record = new.into_reservation(Utc::now());
        let inserted = sqlx::query_as::<_, Reservation>(
            "INSERT INTO reservations \
             (id, resource_id, class_id, resource_kind, requester_id, window_start, window_end, \
              party_size, total, status, notes, idempotency_key, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13) \
             ON CONFLICT (requester_id, idempotency_key) WHERE idempotency_key IS NOT NULL \
             DO NOTHING \
             RETURNING *",
        )
        .bind(record.id)
        .bind(record.resource_id)
        .bind(record.class_id)
        .bind(record.resource_kind)
        .bind(record.requester_id)
        .bind(record.window.start())
        .bind(record.window.end())
        .bind(party_size)
        .bind(record.total)
        .bind(record.status)
        .bind(&record.notes)
        .bind(&record.idempotency_key)
        .bind(record.created_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err("Failed to insert reservation"))?;

        match inserted {
            Some(reservation) => {
                tx.commit()
                    .await
                    .map_err(db_err("Failed to commit reservation"))?;
                info!(
                    reservation_id = %reservation.id,
                    resource_id = %reservation.resource_id,
                    "Reservation row inserted"
                );
                Ok(Stored::Created(reservation))
            }
            None => {
                tx.rollback()
                    .await
                    .map_err(db_err("Failed to roll back reservation"))?;
                let key = record.idempotency_key.as_deref().unwrap_or_default();
                self.find_by_idempotency_key(record.requester_id, key)
                    .await?
                    .map(Stored::Replayed)
                    .ok_or_else(|| {
                        AppError::internal("Reservation insert was skipped without a prior record")
                    })
            }
        }
    }

    async fn find_by_idempotency_key(
        &self,
        requester: UserId,
        key: &str,
    ) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE requester_id = $1 AND idempotency_key = $2",
        )
        .bind(requester)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find reservation by idempotency key"))
    }

    async fn get(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find reservation"))
    }

    async fn list_by_requester(
        &self,
        requester: UserId,
        page: &PageRequest,
    ) -> AppResult<(Vec<Reservation>, u64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE requester_id = $1")
                .bind(requester)
                .fetch_one(&self.pool)
                .await
                .map_err(db_err("Failed to count reservations"))?;

        let items = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE requester_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(requester)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list reservations"))?;

        Ok((items, total as u64))
    }

    async fn transition(
        &self,
        id: ReservationId,
        from: LifecycleStatus,
        to: LifecycleStatus,
    ) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update reservation status"))
    }

    async fn release(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        // Checkout takes the same row lock before billing a reservation.
        let status: Option<LifecycleStatus> =
            sqlx::query_scalar("SELECT status FROM reservations WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err("Failed to lock reservation"))?;
        if status != Some(LifecycleStatus::Pending) {
            return Ok(None);
        }

        let billed: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM order_lines l JOIN orders o ON o.id = l.order_id \
                 WHERE l.reservation_id = $1 AND o.status <> 'cancelled')",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("Failed to check reservation billing"))?;
        if billed {
            return Err(billed_reservation(id));
        }

        let cancelled = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(LifecycleStatus::Cancelled)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("Failed to cancel reservation"))?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit reservation"))?;
        Ok(Some(cancelled))
    }
}
