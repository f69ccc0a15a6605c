//! Order lifecycle engine
//!
//! Owns the legal status graph for purchase orders and is the single writer
//! of inventory increments tied to order verification. Every transition is
//! an atomic conditional update (`UPDATE ... WHERE id = $1 AND status = $2`)
//! checked through the affected-row count, so two concurrent calls for the
//! same order can never both succeed.
//!
//! Status flow: `not assigned -> assigned -> pending_review -> verified ->
//! paid`, with cancellation allowed from the three pre-verification states.
//! Stock is credited exactly once per order, inside the same transaction
//! that flips the status to `verified`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::OrderStatus;
use shared::types::SortOrder;
use shared::validation::{order_total, validate_line_items, LineItem};

/// Maximum attempts at generating a unique order number before giving up
const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// Order lifecycle service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Stored order header
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderRecord {
    pub id: Uuid,
    pub order_number: String,
    pub supplier_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub status: String,
    pub total_amount: Decimal,
    pub bill_url: Option<String>,
    pub notes: Option<String>,
    pub expected_date: Option<NaiveDate>,
    pub assigned_date: Option<DateTime<Utc>>,
    pub pending_review_date: Option<DateTime<Utc>>,
    pub verified_date: Option<DateTime<Utc>>,
    pub paid_date: Option<DateTime<Utc>>,
    pub canceled_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order line item joined with product display fields
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItemDetail {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub expiration_date: Option<NaiveDate>,
    pub remaining_qty: i32,
    pub is_expired: bool,
    pub expired_quantity: i32,
}

/// Order header together with its batches
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: OrderRecord,
    pub items: Vec<OrderItemDetail>,
}

/// One submitted line item
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub expiration_date: Option<NaiveDate>,
}

/// Input for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub supplier_id: Uuid,
    pub items: Vec<OrderItemInput>,
    pub notes: Option<String>,
    pub expected_date: Option<NaiveDate>,
    pub bill_url: Option<String>,
}

/// Input for assigning an order to a staff member
#[derive(Debug, Deserialize)]
pub struct AssignOrderInput {
    pub staff_id: Option<Uuid>,
}

/// Input for submitting an order for review (bill upload)
#[derive(Debug, Deserialize)]
pub struct SubmitForReviewInput {
    pub bill_url: Option<String>,
    pub total_amount: Option<Decimal>,
}

/// Input for verifying an order
#[derive(Debug, Default, Deserialize)]
pub struct VerifyOrderInput {
    pub total_amount: Option<Decimal>,
}

/// Input for canceling an order
#[derive(Debug, Default, Deserialize)]
pub struct CancelOrderInput {
    pub canceled_date: Option<DateTime<Utc>>,
}

/// Input for updating order metadata
#[derive(Debug, Deserialize)]
pub struct UpdateOrderInput {
    pub notes: Option<String>,
    pub expected_date: Option<NaiveDate>,
}

/// Filter for listing orders
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub staff_id: Option<Uuid>,
    pub order_number: Option<String>,
    pub supplier_ids: Option<Vec<Uuid>>,
}

/// Page of orders with pagination metadata
#[derive(Debug, Serialize)]
pub struct OrderPage {
    pub orders: Vec<OrderWithItems>,
    pub total: i64,
    pub pages: i64,
}

/// Per-status counts plus paid spend for the current calendar month
#[derive(Debug, Serialize, FromRow)]
pub struct OrderStats {
    pub not_assigned_orders: i64,
    pub assigned_orders: i64,
    pub pending_review_orders: i64,
    pub verified_orders: i64,
    pub paid_orders: i64,
    pub canceled_orders: i64,
    pub paid_total_this_month: Decimal,
}

/// Overall totals for the analytics view
#[derive(Debug, Serialize, FromRow)]
pub struct AnalyticsSummary {
    pub total_orders: i64,
    pub not_assigned_orders: i64,
    pub assigned_orders: i64,
    pub pending_review_orders: i64,
    pub verified_orders: i64,
    pub paid_orders: i64,
    pub total_spent: Decimal,
}

/// One time bucket of the analytics series
#[derive(Debug, Serialize, FromRow)]
pub struct AnalyticsBucket {
    pub period_label: String,
    pub total_orders: i64,
    pub total_spent: Decimal,
    pub not_assigned_orders: i64,
    pub assigned_orders: i64,
    pub pending_review_orders: i64,
    pub verified_orders: i64,
    pub paid_orders: i64,
}

/// Analytics response: summary plus a time-bucketed series
#[derive(Debug, Serialize)]
pub struct OrderAnalytics {
    pub summary: AnalyticsSummary,
    pub period: String,
    pub data: Vec<AnalyticsBucket>,
}

/// Columns a list request may sort by
const SORTABLE_FIELDS: [&str; 6] = [
    "created_at",
    "updated_at",
    "order_number",
    "total_amount",
    "status",
    "expected_date",
];

const ORDER_COLUMNS: &str = "id, order_number, supplier_id, staff_id, status, total_amount, \
     bill_url, notes, expected_date, assigned_date, pending_review_date, verified_date, \
     paid_date, canceled_date, created_at, updated_at";

/// Generate an order number: `ORD-YYYYMMDD-NNNN`.
///
/// The 4-digit suffix is random; uniqueness is enforced by the unique index
/// on `order_number` with a bounded retry on conflict.
fn generate_order_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = 1000 + (Uuid::new_v4().as_u128() % 9000) as u32;
    format!("ORD-{}-{}", date, suffix)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Lifecycle Transitions
    // ========================================================================

    /// Create an order with one batch per line item.
    ///
    /// Stock is NOT touched here; it is credited when the order is verified.
    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<OrderWithItems> {
        let line_items: Vec<LineItem> = input
            .items
            .iter()
            .map(|item| LineItem {
                quantity: item.quantity,
                unit_cost: item.unit_cost,
            })
            .collect();

        validate_line_items(&line_items).map_err(|msg| AppError::Validation {
            field: "items".to_string(),
            message: msg.to_string(),
        })?;

        let supplier_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(input.supplier_id)
                .fetch_one(&self.db)
                .await?;

        if !supplier_exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        // Every product reference must resolve before anything is written
        for item in &input.items {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
            )
            .bind(item.product_id)
            .fetch_one(&self.db)
            .await?;

            if !exists {
                return Err(AppError::NotFound(format!("Product {}", item.product_id)));
            }
        }

        let total_amount = order_total(&line_items);

        let mut attempts = 0;
        let order_id = loop {
            let order_number = generate_order_number();
            let mut tx = self.db.begin().await?;

            let inserted = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO orders (order_number, supplier_id, status, total_amount,
                                    bill_url, notes, expected_date)
                VALUES ($1, $2, 'not assigned', $3, $4, $5, $6)
                RETURNING id
                "#,
            )
            .bind(&order_number)
            .bind(input.supplier_id)
            .bind(total_amount)
            .bind(&input.bill_url)
            .bind(&input.notes)
            .bind(input.expected_date)
            .fetch_one(&mut *tx)
            .await;

            let order_id = match inserted {
                Ok(id) => id,
                Err(err) if is_unique_violation(&err) => {
                    attempts += 1;
                    if attempts >= MAX_ORDER_NUMBER_ATTEMPTS {
                        return Err(AppError::Internal(
                            "Could not allocate a unique order number".to_string(),
                        ));
                    }
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            for item in &input.items {
                sqlx::query(
                    r#"
                    INSERT INTO order_items (order_id, product_id, quantity, unit_cost,
                                             expiration_date, remaining_qty)
                    VALUES ($1, $2, $3, $4, $5, $3)
                    "#,
                )
                .bind(order_id)
                .bind(item.product_id)
                .bind(item.quantity)
                .bind(item.unit_cost)
                .bind(item.expiration_date)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;
            break order_id;
        };

        self.get_order_with_items(order_id).await
    }

    /// Assign an order to a staff member.
    ///
    /// Only legal from `not assigned`; a second assign yields a conflict.
    pub async fn assign_order(
        &self,
        order_id: Uuid,
        input: AssignOrderInput,
    ) -> AppResult<OrderWithItems> {
        let staff_id = input.staff_id.ok_or_else(|| AppError::Validation {
            field: "staff_id".to_string(),
            message: "Staff ID is required".to_string(),
        })?;

        let staff_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(staff_id)
                .fetch_one(&self.db)
                .await?;

        if !staff_exists {
            return Err(AppError::NotFound("Staff member".to_string()));
        }

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET staff_id = $2, status = 'assigned', assigned_date = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'not assigned'
            "#,
        )
        .bind(order_id)
        .bind(staff_id)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            let current = self.current_status(order_id).await?;
            return Err(AppError::Conflict {
                resource: "order".to_string(),
                message: format!("Order is already {}", current),
            });
        }

        self.get_order_with_items(order_id).await
    }

    /// Submit an order for review with its bill.
    ///
    /// Stores the bill and an optional total-amount override; stock stays
    /// untouched until a second party verifies.
    pub async fn submit_for_review(
        &self,
        order_id: Uuid,
        input: SubmitForReviewInput,
    ) -> AppResult<OrderWithItems> {
        let bill_url = input.bill_url.ok_or_else(|| AppError::Validation {
            field: "bill_url".to_string(),
            message: "Bill image is required".to_string(),
        })?;

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'pending_review', bill_url = $2,
                total_amount = COALESCE($3, total_amount),
                pending_review_date = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'assigned'
            "#,
        )
        .bind(order_id)
        .bind(&bill_url)
        .bind(input.total_amount)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            let current = self.current_status(order_id).await?;
            return Err(AppError::InvalidStateTransition(format!(
                "Order must be assigned before review; current status is '{}'",
                current
            )));
        }

        self.get_order_with_items(order_id).await
    }

    /// Verify a reviewed order and credit product stock.
    ///
    /// The status flip and the per-batch stock increments happen in one
    /// transaction, so the increment runs exactly once per order no matter
    /// how many verify calls race.
    pub async fn verify_order(
        &self,
        order_id: Uuid,
        input: VerifyOrderInput,
    ) -> AppResult<OrderWithItems> {
        let mut tx = self.db.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'verified', total_amount = COALESCE($2, total_amount),
                verified_date = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'pending_review' AND bill_url IS NOT NULL
            "#,
        )
        .bind(order_id)
        .bind(input.total_amount)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            let current = self.current_status(order_id).await?;
            return Err(AppError::InvalidStateTransition(format!(
                "Order must be pending review before verification; current status is '{}'",
                current
            )));
        }

        let batches = sqlx::query_as::<_, (Uuid, i32)>(
            "SELECT product_id, quantity FROM order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        for (product_id, quantity) in batches {
            sqlx::query(
                "UPDATE products SET current_stock = current_stock + $2, updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(%order_id, "order verified, stock credited");

        self.get_order_with_items(order_id).await
    }

    /// Mark a verified order as paid.
    pub async fn mark_paid(&self, order_id: Uuid) -> AppResult<OrderWithItems> {
        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'paid', paid_date = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'verified'
            "#,
        )
        .bind(order_id)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            let current = self.current_status(order_id).await?;
            return Err(AppError::InvalidStateTransition(format!(
                "Order must be verified before payment; current status is '{}'",
                current
            )));
        }

        self.get_order_with_items(order_id).await
    }

    /// Cancel an order.
    ///
    /// Only legal before stock has been credited: once an order is verified
    /// there is no stock-reversal rule, so cancellation is rejected.
    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        input: CancelOrderInput,
    ) -> AppResult<OrderWithItems> {
        let canceled_date = input.canceled_date.unwrap_or_else(Utc::now);

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'canceled', canceled_date = $2, updated_at = NOW()
            WHERE id = $1 AND status IN ('not assigned', 'assigned', 'pending_review')
            "#,
        )
        .bind(order_id)
        .bind(canceled_date)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            let current = self.current_status(order_id).await?;
            return Err(AppError::InvalidStateTransition(format!(
                "Order cannot be canceled; current status is '{}'",
                current
            )));
        }

        self.get_order_with_items(order_id).await
    }

    /// Update order metadata (notes, expected date). Legal in any state.
    pub async fn update_order(
        &self,
        order_id: Uuid,
        input: UpdateOrderInput,
    ) -> AppResult<OrderWithItems> {
        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET notes = COALESCE($2, notes),
                expected_date = COALESCE($3, expected_date),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .bind(&input.notes)
        .bind(input.expected_date)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }

        self.get_order_with_items(order_id).await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get one order; staff callers may only read their own assigned orders.
    pub async fn get_order(&self, order_id: Uuid, caller: &AuthUser) -> AppResult<OrderWithItems> {
        let order = self.get_order_with_items(order_id).await?;

        if !caller.is_admin && order.order.staff_id != Some(caller.user_id) {
            return Err(AppError::NotFound("Order".to_string()));
        }

        Ok(order)
    }

    /// List orders with filtering, sorting and pagination.
    ///
    /// Non-admin callers are always scoped to their own assigned orders.
    pub async fn list_orders(
        &self,
        caller: &AuthUser,
        filter: OrderFilter,
        sort_by: Option<String>,
        sort_order: SortOrder,
        page: i64,
        limit: i64,
    ) -> AppResult<OrderPage> {
        if page < 1 || limit < 1 {
            return Err(AppError::ValidationError(
                "Page and limit must be greater than 0".to_string(),
            ));
        }

        if let Some(ref status) = filter.status {
            if OrderStatus::parse(status).is_none() {
                return Err(AppError::Validation {
                    field: "status".to_string(),
                    message: format!("Invalid status '{}'", status),
                });
            }
        }

        let sort_field = sort_by.unwrap_or_else(|| "created_at".to_string());
        if !SORTABLE_FIELDS.contains(&sort_field.as_str()) {
            return Err(AppError::Validation {
                field: "sort_by".to_string(),
                message: format!("Cannot sort by '{}'", sort_field),
            });
        }

        let push_filters = |qb: &mut QueryBuilder<Postgres>| {
            if !caller.is_admin {
                qb.push(" AND staff_id = ").push_bind(caller.user_id);
            } else if let Some(staff_id) = filter.staff_id {
                qb.push(" AND staff_id = ").push_bind(staff_id);
            }
            if let Some(ref status) = filter.status {
                qb.push(" AND status = ").push_bind(status.clone());
            }
            if let Some(ref number) = filter.order_number {
                qb.push(" AND order_number ILIKE ")
                    .push_bind(format!("%{}%", number));
            }
            if let Some(ref supplier_ids) = filter.supplier_ids {
                if !supplier_ids.is_empty() {
                    qb.push(" AND supplier_id = ANY(")
                        .push_bind(supplier_ids.clone())
                        .push(")");
                }
            }
        };

        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders WHERE TRUE");
        push_filters(&mut count_query);
        let total: i64 = count_query.build_query_scalar().fetch_one(&self.db).await?;

        let mut list_query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM orders WHERE TRUE",
            ORDER_COLUMNS
        ));
        push_filters(&mut list_query);
        list_query.push(format!(
            " ORDER BY {} {} LIMIT ",
            sort_field,
            sort_order.as_sql()
        ));
        list_query.push_bind(limit);
        list_query.push(" OFFSET ");
        list_query.push_bind((page - 1) * limit);

        let orders: Vec<OrderRecord> = list_query
            .build_query_as::<OrderRecord>()
            .fetch_all(&self.db)
            .await?;

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let mut items_by_order = self.fetch_items_for_orders(&order_ids).await?;

        let orders = orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect();

        let pages = (total + limit - 1) / limit;

        Ok(OrderPage {
            orders,
            total,
            pages,
        })
    }

    /// Per-status counts plus paid spend in the current calendar month.
    pub async fn get_order_stats(&self, caller: &AuthUser) -> AppResult<OrderStats> {
        let stats = if caller.is_admin {
            sqlx::query_as::<_, OrderStats>(&stats_query(""))
                .fetch_one(&self.db)
                .await?
        } else {
            sqlx::query_as::<_, OrderStats>(&stats_query("WHERE staff_id = $1"))
                .bind(caller.user_id)
                .fetch_one(&self.db)
                .await?
        };

        Ok(stats)
    }

    /// Time-bucketed order analytics by week, month or year.
    pub async fn get_order_analytics(&self, period: &str) -> AppResult<OrderAnalytics> {
        let (bucket_format, limit) = match period {
            "week" => ("IYYY-\"W\"IW", 8i64),
            "month" => ("YYYY-MM", 12),
            "year" => ("YYYY", 5),
            _ => {
                return Err(AppError::Validation {
                    field: "period".to_string(),
                    message: "Invalid period. Use 'week', 'month', or 'year'".to_string(),
                })
            }
        };

        let summary = sqlx::query_as::<_, AnalyticsSummary>(
            r#"
            SELECT
                COUNT(*) AS total_orders,
                COUNT(*) FILTER (WHERE status = 'not assigned') AS not_assigned_orders,
                COUNT(*) FILTER (WHERE status = 'assigned') AS assigned_orders,
                COUNT(*) FILTER (WHERE status = 'pending_review') AS pending_review_orders,
                COUNT(*) FILTER (WHERE status = 'verified') AS verified_orders,
                COUNT(*) FILTER (WHERE status = 'paid') AS paid_orders,
                COALESCE(SUM(total_amount) FILTER (WHERE status = 'paid'), 0) AS total_spent
            FROM orders
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let bucket_expr = format!("date_trunc('{}', created_at)", period);
        let mut data = sqlx::query_as::<_, AnalyticsBucket>(&format!(
            r#"
            SELECT
                to_char({bucket}, '{format}') AS period_label,
                COUNT(*) AS total_orders,
                COALESCE(SUM(total_amount) FILTER (WHERE status = 'paid'), 0) AS total_spent,
                COUNT(*) FILTER (WHERE status = 'not assigned') AS not_assigned_orders,
                COUNT(*) FILTER (WHERE status = 'assigned') AS assigned_orders,
                COUNT(*) FILTER (WHERE status = 'pending_review') AS pending_review_orders,
                COUNT(*) FILTER (WHERE status = 'verified') AS verified_orders,
                COUNT(*) FILTER (WHERE status = 'paid') AS paid_orders
            FROM orders
            GROUP BY {bucket}
            ORDER BY {bucket} DESC
            LIMIT $1
            "#,
            bucket = bucket_expr,
            format = bucket_format,
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        // Oldest bucket first for charting
        data.reverse();

        Ok(OrderAnalytics {
            summary,
            period: period.to_string(),
            data,
        })
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    async fn current_status(&self, order_id: Uuid) -> AppResult<String> {
        sqlx::query_scalar::<_, String>("SELECT status FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    async fn get_order_with_items(&self, order_id: Uuid) -> AppResult<OrderWithItems> {
        let order = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let mut items_by_order = self.fetch_items_for_orders(&[order_id]).await?;
        let items = items_by_order.remove(&order_id).unwrap_or_default();

        Ok(OrderWithItems { order, items })
    }

    async fn fetch_items_for_orders(
        &self,
        order_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<OrderItemDetail>>> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name,
                   p.image_url AS product_image_url, oi.quantity, oi.unit_cost,
                   oi.expiration_date, oi.remaining_qty, oi.is_expired, oi.expired_quantity
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.created_at ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderItemDetail>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row);
        }

        Ok(grouped)
    }
}

fn stats_query(where_clause: &str) -> String {
    format!(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE status = 'not assigned') AS not_assigned_orders,
            COUNT(*) FILTER (WHERE status = 'assigned') AS assigned_orders,
            COUNT(*) FILTER (WHERE status = 'pending_review') AS pending_review_orders,
            COUNT(*) FILTER (WHERE status = 'verified') AS verified_orders,
            COUNT(*) FILTER (WHERE status = 'paid') AS paid_orders,
            COUNT(*) FILTER (WHERE status = 'canceled') AS canceled_orders,
            COALESCE(SUM(total_amount) FILTER (
                WHERE status = 'paid' AND created_at >= date_trunc('month', NOW())
            ), 0) AS paid_total_this_month
        FROM orders
        {}
        "#,
        where_clause
    )
}
