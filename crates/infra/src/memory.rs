//! In-memory store for tests and local development.
//!
//! A single `RwLock` guards all tables so cascades are atomic. No lock is held
//! across an `.await`.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use osdesk_auth::User;
use osdesk_core::{ClientId, DomainError, OrderId, ProductId, UserId};
use osdesk_orders::{OrderDetail, OrderQuery, OrderStatus, Page, ServiceOrder};
use osdesk_parties::{Client, CompanyProfile, sort_by_name};
use osdesk_products::{Product, ProductFilter};

use crate::repository::{
    ClientRemoval, ClientRepository, CompanyRepository, OrderRepository, ProductRepository,
    UserRepository,
};
use crate::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    clients: HashMap<ClientId, Client>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, ServiceOrder>,
    users: HashMap<UserId, User>,
    company: Option<CompanyProfile>,
}

impl Tables {
    fn detail(&self, order: &ServiceOrder) -> OrderDetail {
        let client_name = self
            .clients
            .get(&order.client_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        OrderDetail::resolve(order.clone(), client_name, &self.products)
    }

    fn details_newest_first(&self, keep: impl Fn(&ServiceOrder) -> bool) -> Vec<OrderDetail> {
        let mut out: Vec<OrderDetail> = self
            .orders
            .values()
            .filter(|o| keep(o))
            .map(|o| self.detail(o))
            .collect();
        out.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
        out
    }

    /// Mirror the foreign keys of the relational schema.
    fn check_references(&self, order: &ServiceOrder) -> StoreResult<()> {
        if !self.clients.contains_key(&order.client_id) {
            return Err(StoreError::NotFound("client"));
        }
        if order.lines.iter().any(|l| !self.products.contains_key(&l.product_id)) {
            return Err(DomainError::validation("unknown product").into());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn insert_client(&self, client: &Client) -> StoreResult<()> {
        let mut t = self.write()?;
        if t.clients.values().any(|c| c.tax_id == client.tax_id) {
            return Err(StoreError::Conflict(format!("tax id {} already registered", client.tax_id)));
        }
        t.clients.insert(client.id, client.clone());
        Ok(())
    }

    async fn update_client(&self, client: &Client) -> StoreResult<()> {
        let mut t = self.write()?;
        if !t.clients.contains_key(&client.id) {
            return Err(StoreError::NotFound("client"));
        }
        if t.clients.values().any(|c| c.id != client.id && c.tax_id == client.tax_id) {
            return Err(StoreError::Conflict(format!("tax id {} already registered", client.tax_id)));
        }
        t.clients.insert(client.id, client.clone());
        Ok(())
    }

    async fn delete_client(&self, id: ClientId) -> StoreResult<ClientRemoval> {
        let mut t = self.write()?;
        if t.clients.remove(&id).is_none() {
            return Err(StoreError::NotFound("client"));
        }

        let mut removal = ClientRemoval::default();
        t.orders.retain(|_, o| {
            if o.client_id == id {
                removal.orders += 1;
                removal.lines += o.lines.len() as u64;
                false
            } else {
                true
            }
        });
        Ok(removal)
    }

    async fn get_client(&self, id: ClientId) -> StoreResult<Client> {
        self.read()?
            .clients
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("client"))
    }

    async fn list_clients(&self, term: Option<&str>) -> StoreResult<Vec<Client>> {
        let t = self.read()?;
        let mut out: Vec<Client> = t
            .clients
            .values()
            .filter(|c| term.is_none_or(|term| c.matches_term(term)))
            .cloned()
            .collect();
        sort_by_name(&mut out);
        Ok(out)
    }

    async fn count_clients(&self) -> StoreResult<usize> {
        Ok(self.read()?.clients.len())
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        self.write()?.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> StoreResult<()> {
        let mut t = self.write()?;
        match t.products.get_mut(&product.id) {
            Some(slot) => {
                *slot = product.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound("product")),
        }
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<u64> {
        let mut t = self.write()?;
        if t.products.remove(&id).is_none() {
            return Err(StoreError::NotFound("product"));
        }

        let mut removed = 0u64;
        for order in t.orders.values_mut() {
            let before = order.lines.len();
            order.lines.retain(|l| l.product_id != id);
            removed += (before - order.lines.len()) as u64;
        }
        Ok(removed)
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Product> {
        self.read()?
            .products
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("product"))
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let t = self.read()?;
        Ok(filter.apply(t.products.values().cloned()))
    }

    async fn existing_products(&self, ids: &[ProductId]) -> StoreResult<HashSet<ProductId>> {
        let t = self.read()?;
        Ok(ids.iter().copied().filter(|id| t.products.contains_key(id)).collect())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn insert_order(&self, order: &ServiceOrder) -> StoreResult<()> {
        let mut t = self.write()?;
        t.check_references(order)?;
        if t.orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.id)));
        }
        t.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn save_order(&self, order: &ServiceOrder) -> StoreResult<()> {
        let mut t = self.write()?;
        if !t.orders.contains_key(&order.id) {
            return Err(StoreError::NotFound("order"));
        }
        t.check_references(order)?;
        t.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> StoreResult<ServiceOrder> {
        self.read()?
            .orders
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("order"))
    }

    async fn order_detail(&self, id: OrderId) -> StoreResult<OrderDetail> {
        let t = self.read()?;
        let order = t.orders.get(&id).ok_or(StoreError::NotFound("order"))?;
        Ok(t.detail(order))
    }

    async fn all_orders(&self) -> StoreResult<Vec<OrderDetail>> {
        Ok(self.read()?.details_newest_first(|_| true))
    }

    async fn search_orders(&self, query: &OrderQuery) -> StoreResult<Page<OrderDetail>> {
        let t = self.read()?;
        Ok(query.apply(t.orders.values().map(|o| t.detail(o))))
    }

    async fn orders_for_client(&self, client_id: ClientId) -> StoreResult<Vec<OrderDetail>> {
        Ok(self.read()?.details_newest_first(|o| o.client_id == client_id))
    }

    async fn orders_with_status(&self, status: OrderStatus) -> StoreResult<Vec<OrderDetail>> {
        Ok(self.read()?.details_newest_first(|o| o.status == status))
    }

    async fn orders_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<OrderDetail>> {
        Ok(self
            .read()?
            .details_newest_first(|o| o.created_at >= from && o.created_at < to))
    }

    async fn count_orders(&self) -> StoreResult<usize> {
        Ok(self.read()?.orders.len())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut t = self.write()?;
        if t.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!("username {} is taken", user.username)));
        }
        t.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut t = self.write()?;
        if !t.users.contains_key(&user.id) {
            return Err(StoreError::NotFound("user"));
        }
        if t.users.values().any(|u| u.id != user.id && u.username == user.username) {
            return Err(StoreError::Conflict(format!("username {} is taken", user.username)));
        }
        t.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        self.write()?
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("user"))
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        self.read()?
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("user"))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.read()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn count_users(&self) -> StoreResult<usize> {
        Ok(self.read()?.users.len())
    }
}

#[async_trait]
impl CompanyRepository for InMemoryStore {
    async fn get_company(&self) -> StoreResult<Option<CompanyProfile>> {
        Ok(self.read()?.company.clone())
    }

    async fn save_company(&self, profile: &CompanyProfile) -> StoreResult<()> {
        self.write()?.company = Some(profile.clone());
        Ok(())
    }
}
