use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use osdesk_core::ClientId;
use osdesk_parties::Client;

use super::{PgStore, like_pattern, map_sqlx_error};
use crate::repository::{ClientRemoval, ClientRepository};
use crate::{StoreError, StoreResult};

#[derive(Debug, FromRow)]
struct ClientRow {
    id: Uuid,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    tax_id: String,
    city: Option<String>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: ClientId::from_uuid(row.id),
            name: row.name,
            phone: row.phone,
            email: row.email,
            tax_id: row.tax_id,
            city: row.city,
        }
    }
}

#[async_trait]
impl ClientRepository for PgStore {
    async fn insert_client(&self, client: &Client) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, name, phone, email, tax_id, city)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(&client.name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.tax_id)
        .bind(&client.city)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_client", e))?;
        Ok(())
    }

    async fn update_client(&self, client: &Client) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET name = $2, phone = $3, email = $4, tax_id = $5, city = $6
            WHERE id = $1
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(&client.name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.tax_id)
        .bind(&client.city)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_client", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("client"));
        }
        Ok(())
    }

    async fn delete_client(&self, id: ClientId) -> StoreResult<ClientRemoval> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let lines = sqlx::query(
            "DELETE FROM order_lines WHERE order_id IN (SELECT id FROM service_orders WHERE client_id = $1)",
        )
        .bind(id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("delete_client_lines", e))?
        .rows_affected();

        let orders = sqlx::query("DELETE FROM service_orders WHERE client_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_client_orders", e))?
            .rows_affected();

        let clients = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_client", e))?
            .rows_affected();

        if clients == 0 {
            return Err(StoreError::NotFound("client"));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(ClientRemoval { orders, lines })
    }

    async fn get_client(&self, id: ClientId) -> StoreResult<Client> {
        sqlx::query_as::<_, ClientRow>(
            "SELECT id, name, phone, email, tax_id, city FROM clients WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_client", e))?
        .map(Client::from)
        .ok_or(StoreError::NotFound("client"))
    }

    async fn list_clients(&self, term: Option<&str>) -> StoreResult<Vec<Client>> {
        let pattern = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(like_pattern);

        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, phone, email, tax_id, city
            FROM clients
            WHERE $1::text IS NULL
               OR name ILIKE $1
               OR tax_id ILIKE $1
               OR email ILIKE $1
            ORDER BY lower(name) ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_clients", e))?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    async fn count_clients(&self) -> StoreResult<usize> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clients")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_clients", e))?;
        Ok(n.max(0) as usize)
    }
}
