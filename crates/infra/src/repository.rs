//! Async repository traits shared by every storage backend.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use osdesk_auth::User;
use osdesk_core::{ClientId, OrderId, ProductId, UserId};
use osdesk_orders::{OrderDetail, OrderQuery, OrderStatus, Page, ServiceOrder};
use osdesk_parties::{Client, CompanyProfile};
use osdesk_products::{Product, ProductFilter};

use crate::StoreResult;

/// What a client deletion took with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientRemoval {
    pub orders: u64,
    pub lines: u64,
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Fails with `Conflict` when the tax id is already registered.
    async fn insert_client(&self, client: &Client) -> StoreResult<()>;
    async fn update_client(&self, client: &Client) -> StoreResult<()>;
    /// Removes the client, its orders and their lines in one step.
    async fn delete_client(&self, id: ClientId) -> StoreResult<ClientRemoval>;
    async fn get_client(&self, id: ClientId) -> StoreResult<Client>;
    /// Ordered by name; `term` matches name, tax id or email.
    async fn list_clients(&self, term: Option<&str>) -> StoreResult<Vec<Client>>;
    async fn count_clients(&self) -> StoreResult<usize>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert_product(&self, product: &Product) -> StoreResult<()>;
    async fn update_product(&self, product: &Product) -> StoreResult<()>;
    /// Removes the product and every order line referencing it; returns the
    /// number of lines removed.
    async fn delete_product(&self, id: ProductId) -> StoreResult<u64>;
    async fn get_product(&self, id: ProductId) -> StoreResult<Product>;
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;
    /// The subset of `ids` present in the catalog.
    async fn existing_products(&self, ids: &[ProductId]) -> StoreResult<HashSet<ProductId>>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert_order(&self, order: &ServiceOrder) -> StoreResult<()>;
    /// Persist header fields and replace the line set.
    async fn save_order(&self, order: &ServiceOrder) -> StoreResult<()>;
    async fn get_order(&self, id: OrderId) -> StoreResult<ServiceOrder>;
    async fn order_detail(&self, id: OrderId) -> StoreResult<OrderDetail>;
    async fn all_orders(&self) -> StoreResult<Vec<OrderDetail>>;
    async fn search_orders(&self, query: &OrderQuery) -> StoreResult<Page<OrderDetail>>;
    /// Newest first.
    async fn orders_for_client(&self, client_id: ClientId) -> StoreResult<Vec<OrderDetail>>;
    /// Newest first.
    async fn orders_with_status(&self, status: OrderStatus) -> StoreResult<Vec<OrderDetail>>;
    /// Orders with `from <= created_at < to`.
    async fn orders_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<OrderDetail>>;
    async fn count_orders(&self) -> StoreResult<usize>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn update_user(&self, user: &User) -> StoreResult<()>;
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;
    async fn get_user(&self, id: UserId) -> StoreResult<User>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn count_users(&self) -> StoreResult<usize>;
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn get_company(&self) -> StoreResult<Option<CompanyProfile>>;
    async fn save_company(&self, profile: &CompanyProfile) -> StoreResult<()>;
}

/// Everything the application needs from storage.
pub trait Store:
    ClientRepository + ProductRepository + OrderRepository + UserRepository + CompanyRepository
{
}

impl<T> Store for T where
    T: ClientRepository + ProductRepository + OrderRepository + UserRepository + CompanyRepository
{
}
