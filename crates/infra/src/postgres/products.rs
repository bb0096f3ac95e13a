use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use osdesk_core::ProductId;
use osdesk_products::{Product, ProductFilter, ProductKind};

use super::{PgStore, cents_of, like_pattern, map_sqlx_error, money_from_cents};
use crate::repository::ProductRepository;
use crate::{StoreError, StoreResult};

#[derive(Debug, FromRow)]
pub(super) struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    unit_price_cents: i64,
    kind: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> StoreResult<Self> {
        Ok(Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            unit_price: money_from_cents(row.unit_price_cents, "products.unit_price_cents")?,
            kind: parse_kind(&row.kind)?,
        })
    }
}

pub(super) fn parse_kind(raw: &str) -> StoreResult<ProductKind> {
    raw.parse()
        .map_err(|_| StoreError::Corrupt(format!("unknown product kind {raw:?}")))
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, unit_price_cents, kind)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(cents_of(product.unit_price)?)
        .bind(product.kind.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE products SET name = $2, description = $3, unit_price_cents = $4 WHERE id = $1",
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(cents_of(product.unit_price)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("product"));
        }
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let lines = sqlx::query("DELETE FROM order_lines WHERE product_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_product_lines", e))?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::NotFound("product"));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(lines)
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Product> {
        sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, unit_price_cents, kind FROM products WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?
        .ok_or(StoreError::NotFound("product"))?
        .try_into()
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let pattern = filter
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(like_pattern);

        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, description, unit_price_cents, kind
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1)
              AND ($2::text IS NULL OR kind = $2)
            ORDER BY lower(name) ASC
            "#,
        )
        .bind(pattern)
        .bind(filter.kind.map(ProductKind::as_str))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn existing_products(&self, ids: &[ProductId]) -> StoreResult<HashSet<ProductId>> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = ANY($1)")
            .bind(&uuids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("existing_products", e))?;

        Ok(rows.into_iter().map(|(id,)| ProductId::from_uuid(id)).collect())
    }
}
