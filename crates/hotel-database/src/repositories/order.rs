//! Order repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::{OrderId, PageRequest, ReservationId, UserId};
use hotel_entity::LifecycleStatus;
use hotel_entity::order::{NewOrder, Order, OrderLine, OrderWithLines};

use crate::error::db_err;
use crate::store::{OrderStore, Stored};

/// Repository for orders and order lines.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lines_of(&self, order_id: OrderId) -> AppResult<Vec<OrderLine>> {
        sqlx::query_as::<_, OrderLine>(
            "SELECT * FROM order_lines WHERE order_id = $1 ORDER BY position",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to load order lines"))
    }

    async fn with_lines(&self, order: Option<Order>) -> AppResult<Option<OrderWithLines>> {
        match order {
            Some(order) => {
                let lines = self.lines_of(order.id).await?;
                Ok(Some(OrderWithLines { order, lines }))
            }
            None => Ok(None),
        }
    }

    /// Lock a reservation that is about to be billed.
    async fn lock_reservation(
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: ReservationId,
    ) -> AppResult<Option<(UserId, LifecycleStatus)>> {
        sqlx::query_as("SELECT requester_id, status FROM reservations WHERE id = $1 FOR UPDATE")
            .bind(reservation_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_err("Failed to lock reservation"))
    }

    /// Re-check a locked reservation: still pending, owned, not billed.
    async fn ensure_billable(
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: ReservationId,
        locked: Option<(UserId, LifecycleStatus)>,
        requester: UserId,
    ) -> AppResult<()> {
        let details = serde_json::json!({ "reservation_id": reservation_id });
        match locked {
            Some((owner, LifecycleStatus::Pending)) if owner == requester => {}
            _ => {
                return Err(AppError::conflict(format!(
                    "Reservation {reservation_id} can no longer be billed"
                ))
                .with_field("lines")
                .with_details(details));
            }
        }

        let billed: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM order_lines l JOIN orders o ON o.id = l.order_id \
                 WHERE l.reservation_id = $1 AND o.status <> 'cancelled')",
        )
        .bind(reservation_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_err("Failed to check reservation billing"))?;

        if billed {
            return Err(AppError::conflict(format!(
                "Reservation {reservation_id} is already billed by another order"
            ))
            .with_field("lines")
            .with_details(details));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn insert(&self, new: NewOrder) -> AppResult<Stored<OrderWithLines>> {
        if let Some(key) = new.idempotency_key.as_deref() {
            if let Some(existing) = self.find_by_idempotency_key(new.requester_id, key).await? {
                return Ok(Stored::Replayed(existing));
            }
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        // Lock in id order so two checkouts sharing reservations cannot deadlock.
        let mut reservation_ids: Vec<ReservationId> =
            new.lines.iter().filter_map(|l| l.reservation_id).collect();
        reservation_ids.sort_by_key(|id| id.into_uuid());
        reservation_ids.dedup();
        let mut locked = Vec::with_capacity(reservation_ids.len());
        for reservation_id in reservation_ids {
            let row = Self::lock_reservation(&mut tx, reservation_id).await?;
            locked.push((reservation_id, row));
        }

        // A retry may have been serialized behind the original on those locks.
        if let (Some(key), false) = (new.idempotency_key.as_deref(), locked.is_empty()) {
            let existing: Option<Order> = sqlx::query_as(
                "SELECT * FROM orders WHERE requester_id = $1 AND idempotency_key = $2",
            )
            .bind(new.requester_id)
            .bind(key)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err("Failed to find order by idempotency key"))?;
            if existing.is_some() {
                drop(tx);
                let replay = self
                    .with_lines(existing)
                    .await?
                    .ok_or_else(|| AppError::internal("Replayed order disappeared"))?;
                return Ok(Stored::Replayed(replay));
            }
        }

        for (reservation_id, row) in locked {
            Self::ensure_billable(&mut tx, reservation_id, row, new.requester_id).await?;
        }

        let record = new.into_order(Utc::now());
        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders \
             (id, requester_id, total, status, table_number, notes, idempotency_key, \
              created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
             ON CONFLICT (requester_id, idempotency_key) WHERE idempotency_key IS NOT NULL \
             DO NOTHING \
             RETURNING *",
        )
        .bind(record.order.id)
        .bind(record.order.requester_id)
        .bind(record.order.total)
        .bind(record.order.status)
        .bind(&record.order.table_number)
        .bind(&record.order.notes)
        .bind(&record.order.idempotency_key)
        .bind(record.order.created_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err("Failed to insert order"))?;

        let Some(order) = order else {
            tx.rollback()
                .await
                .map_err(db_err("Failed to roll back order"))?;
            let key = record.order.idempotency_key.as_deref().unwrap_or_default();
            return self
                .find_by_idempotency_key(record.order.requester_id, key)
                .await?
                .map(Stored::Replayed)
                .ok_or_else(|| AppError::internal("Order insert was skipped without a prior record"));
        };

        let mut lines = Vec::with_capacity(record.lines.len());
        for (position, line) in record.lines.iter().enumerate() {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                AppError::validation("Quantity is out of range").with_field("quantity")
            })?;
            let stored = sqlx::query_as::<_, OrderLine>(
                "INSERT INTO order_lines \
                 (id, order_id, position, kind, catalog_item_id, reservation_id, description, \
                  quantity, unit_price, line_total, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
                 RETURNING *",
            )
            .bind(line.id)
            .bind(order.id)
            .bind(position as i32)
            .bind(line.kind)
            .bind(line.catalog_item_id)
            .bind(line.reservation_id)
            .bind(&line.description)
            .bind(quantity)
            .bind(line.unit_price)
            .bind(line.line_total)
            .bind(line.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err("Failed to insert order line"))?;
            lines.push(stored);
        }

        tx.commit().await.map_err(db_err("Failed to commit order"))?;
        info!(order_id = %order.id, lines = lines.len(), "Order rows inserted");

        Ok(Stored::Created(OrderWithLines { order, lines }))
    }

    async fn find_by_idempotency_key(
        &self,
        requester: UserId,
        key: &str,
    ) -> AppResult<Option<OrderWithLines>> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE requester_id = $1 AND idempotency_key = $2",
        )
        .bind(requester)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find order by idempotency key"))?;
        self.with_lines(order).await
    }

    async fn get(&self, id: OrderId) -> AppResult<Option<OrderWithLines>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find order"))?;
        self.with_lines(order).await
    }

    async fn list_by_requester(
        &self,
        requester: UserId,
        page: &PageRequest,
    ) -> AppResult<(Vec<Order>, u64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE requester_id = $1")
            .bind(requester)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count orders"))?;

        let items = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE requester_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(requester)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list orders"))?;

        Ok((items, total as u64))
    }

    async fn transition(
        &self,
        id: OrderId,
        from: LifecycleStatus,
        to: LifecycleStatus,
    ) -> AppResult<Option<Order>> {
        sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update order status"))
    }

    async fn billed_reservations(&self, ids: &[ReservationId]) -> AppResult<Vec<ReservationId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, ReservationId>(
            "SELECT DISTINCT l.reservation_id FROM order_lines l \
             JOIN orders o ON o.id = l.order_id \
             WHERE l.reservation_id = ANY($1) AND o.status <> 'cancelled'",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to find billed reservations"))
    }
}
