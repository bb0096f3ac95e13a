use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, Transaction};
use uuid::Uuid;

use osdesk_core::{ClientId, OrderId, OrderLineId, ProductId};
use osdesk_orders::{
    LineDetail, OrderDetail, OrderLine, OrderQuery, OrderStatus, Page, ServiceOrder,
};
use osdesk_products::Product;

use super::products::parse_kind;
use super::{PgStore, cents_of, like_pattern, map_sqlx_error, money_from_cents};
use crate::repository::OrderRepository;
use crate::{StoreError, StoreResult};

const ORDER_COLUMNS: &str = r#"
    o.id, o.client_id, o.created_at, o.notes, o.discount_cents, o.status,
    c.name AS client_name
"#;

fn select_orders(tail: &str) -> String {
    format!(
        "SELECT {} FROM service_orders o JOIN clients c ON c.id = o.client_id {}",
        ORDER_COLUMNS, tail
    )
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    client_id: Uuid,
    created_at: DateTime<Utc>,
    notes: Option<String>,
    discount_cents: i64,
    status: String,
    client_name: String,
}

#[derive(Debug, FromRow)]
struct LineRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    product_name: Option<String>,
    product_description: Option<String>,
    product_price_cents: Option<i64>,
    product_kind: Option<String>,
}

impl LineRow {
    fn into_detail(self) -> StoreResult<LineDetail> {
        let quantity = u32::try_from(self.quantity)
            .map_err(|_| StoreError::Corrupt(format!("negative quantity on line {}", self.id)))?;
        let product_id = ProductId::from_uuid(self.product_id);

        let product = match (self.product_name, self.product_price_cents, self.product_kind) {
            (Some(name), Some(cents), Some(kind)) => Some(Product {
                id: product_id,
                name,
                description: self.product_description,
                unit_price: money_from_cents(cents, "products.unit_price_cents")?,
                kind: parse_kind(&kind)?,
            }),
            _ => None,
        };

        Ok(LineDetail {
            line: OrderLine {
                id: OrderLineId::from_uuid(self.id),
                product_id,
                quantity,
            },
            product,
        })
    }
}

fn parse_status(raw: &str) -> StoreResult<OrderStatus> {
    OrderStatus::parse(raw).ok_or_else(|| StoreError::Corrupt(format!("unknown order status {raw:?}")))
}

impl PgStore {
    /// Attach lines (with their products) to a batch of order headers,
    /// keeping the header order.
    async fn hydrate(&self, rows: Vec<OrderRow>) -> StoreResult<Vec<OrderDetail>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let line_rows = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT
                l.id, l.order_id, l.product_id, l.quantity,
                p.name AS product_name,
                p.description AS product_description,
                p.unit_price_cents AS product_price_cents,
                p.kind AS product_kind
            FROM order_lines l
            LEFT JOIN products p ON p.id = l.product_id
            WHERE l.order_id = ANY($1)
            ORDER BY l.order_id, l.position ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_order_lines", e))?;

        let mut by_order: HashMap<Uuid, Vec<LineDetail>> = HashMap::new();
        for row in line_rows {
            let order_id = row.order_id;
            by_order.entry(order_id).or_default().push(row.into_detail()?);
        }

        rows.into_iter()
            .map(|row| {
                let lines = by_order.remove(&row.id).unwrap_or_default();
                let order = ServiceOrder {
                    id: OrderId::from_uuid(row.id),
                    client_id: ClientId::from_uuid(row.client_id),
                    created_at: row.created_at,
                    notes: row.notes,
                    discount: money_from_cents(row.discount_cents, "service_orders.discount_cents")?,
                    status: parse_status(&row.status)?,
                    lines: lines.iter().map(|l| l.line.clone()).collect(),
                };
                Ok(OrderDetail {
                    order,
                    client_name: row.client_name,
                    lines,
                })
            })
            .collect()
    }

    async fn fetch_details(
        &self,
        operation: &'static str,
        query: sqlx::query::QueryAs<'_, Postgres, OrderRow, sqlx::postgres::PgArguments>,
    ) -> StoreResult<Vec<OrderDetail>> {
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        self.hydrate(rows).await
    }
}

async fn insert_lines(tx: &mut Transaction<'_, Postgres>, order: &ServiceOrder) -> StoreResult<()> {
    for (position, line) in order.lines.iter().enumerate() {
        let quantity = i32::try_from(line.quantity)
            .map_err(|_| osdesk_core::DomainError::validation("quantity is too large"))?;
        sqlx::query(
            r#"
            INSERT INTO order_lines (id, order_id, product_id, quantity, position)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(line.id.as_uuid())
        .bind(order.id.as_uuid())
        .bind(line.product_id.as_uuid())
        .bind(quantity)
        .bind(position as i32)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order_line", e))?;
    }
    Ok(())
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn insert_order(&self, order: &ServiceOrder) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO service_orders (id, client_id, created_at, notes, discount_cents, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.client_id.as_uuid())
        .bind(order.created_at)
        .bind(&order.notes)
        .bind(cents_of(order.discount)?)
        .bind(order.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| match map_sqlx_error("insert_order", e) {
            StoreError::Domain(_) => StoreError::NotFound("client"),
            other => other,
        })?;

        insert_lines(&mut tx, order).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    async fn save_order(&self, order: &ServiceOrder) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let updated = sqlx::query(
            r#"
            UPDATE service_orders
            SET created_at = $2, notes = $3, discount_cents = $4, status = $5
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.created_at)
        .bind(&order.notes)
        .bind(cents_of(order.discount)?)
        .bind(order.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_order", e))?
        .rows_affected();

        if updated == 0 {
            return Err(StoreError::NotFound("order"));
        }

        sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
            .bind(order.id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("replace_order_lines", e))?;

        insert_lines(&mut tx, order).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> StoreResult<ServiceOrder> {
        Ok(self.order_detail(id).await?.order)
    }

    async fn order_detail(&self, id: OrderId) -> StoreResult<OrderDetail> {
        let sql = select_orders("WHERE o.id = $1");
        self.fetch_details("order_detail", sqlx::query_as(&sql).bind(*id.as_uuid()))
            .await?
            .pop()
            .ok_or(StoreError::NotFound("order"))
    }

    async fn all_orders(&self) -> StoreResult<Vec<OrderDetail>> {
        let sql = select_orders("ORDER BY o.created_at DESC");
        self.fetch_details("all_orders", sqlx::query_as(&sql)).await
    }

    async fn search_orders(&self, query: &OrderQuery) -> StoreResult<Page<OrderDetail>> {
        let status = match query.status.as_deref() {
            None => None,
            Some(raw) => match OrderStatus::parse(raw) {
                Some(s) => Some(s.as_str()),
                None => return Ok(Page::new(Vec::new(), query.pagination, 0)),
            },
        };
        let pattern = query.term.as_deref().map(like_pattern);
        let month = query.month.map(|m| m as i32);

        let filters = r#"
            WHERE ($1::text IS NULL
                   OR c.name ILIKE $1
                   OR to_char(o.created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD HH24:MI:SS') ILIKE $1)
              AND ($2::text IS NULL OR o.status = $2)
              AND ($3::int IS NULL OR EXTRACT(MONTH FROM o.created_at AT TIME ZONE 'UTC') = $3)
        "#;

        let (total,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM service_orders o JOIN clients c ON c.id = o.client_id {filters}"
        ))
            .bind(&pattern)
            .bind(status)
            .bind(month)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_orders_search", e))?;

        let sql = select_orders(&format!("{filters} ORDER BY o.created_at DESC LIMIT $4 OFFSET $5"));
        let items = self
            .fetch_details(
                "search_orders",
                sqlx::query_as(&sql)
                    .bind(pattern.clone())
                    .bind(status)
                    .bind(month)
                    .bind(i64::try_from(query.pagination.per_page).unwrap_or(i64::MAX))
                    .bind(i64::try_from(query.pagination.offset()).unwrap_or(i64::MAX)),
            )
            .await?;

        Ok(Page::new(items, query.pagination, total.max(0) as usize))
    }

    async fn orders_for_client(&self, client_id: ClientId) -> StoreResult<Vec<OrderDetail>> {
        let sql = select_orders("WHERE o.client_id = $1 ORDER BY o.created_at DESC");
        self.fetch_details("orders_for_client", sqlx::query_as(&sql).bind(*client_id.as_uuid()))
            .await
    }

    async fn orders_with_status(&self, status: OrderStatus) -> StoreResult<Vec<OrderDetail>> {
        let sql = select_orders("WHERE o.status = $1 ORDER BY o.created_at DESC");
        self.fetch_details("orders_with_status", sqlx::query_as(&sql).bind(status.as_str()))
            .await
    }

    async fn orders_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<OrderDetail>> {
        let sql = select_orders("WHERE o.created_at >= $1 AND o.created_at < $2 ORDER BY o.created_at DESC");
        self.fetch_details("orders_created_between", sqlx::query_as(&sql).bind(from).bind(to))
            .await
    }

    async fn count_orders(&self) -> StoreResult<usize> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM service_orders")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_orders", e))?;
        Ok(n.max(0) as usize)
    }
}
