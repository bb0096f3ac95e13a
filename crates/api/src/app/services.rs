//! Application services: storage, session tokens and document rendering
//! wired together behind the operations the routes call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use osdesk_auth::{AuthError, Registration, TokenConfig, User, UserUpdate, issue_token};
use osdesk_billing::{DashboardSummary, MonthPeriod, MonthlyReport};
use osdesk_core::{ClientId, DomainError, OrderId, ProductId, UserId};
use osdesk_documents::{DocumentRenderer, OrderDocument, PdfRenderer, RenderError};
use osdesk_infra::{
    ClientRemoval, ClientRepository, CompanyRepository, InMemoryStore, OrderRepository, PgStore,
    ProductRepository, Store, StoreError, UserRepository,
};
use osdesk_orders::{
    EditOrder, EditOutcome, NewOrder, OrderDetail, OrderQuery, OrderStatus, Page, ServiceOrder,
};
use osdesk_parties::{Client, ClientDetails, CompanyDetails, CompanyProfile};
use osdesk_products::{NewProduct, Product, ProductFilter, ProductUpdate};

use crate::config::{AppConfig, BootstrapAdmin};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        Self::Store(StoreError::Domain(value))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// A rendered order document ready to be served.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Shared state handed to every handler through an `Extension`.
pub struct AppServices {
    store: Arc<dyn Store>,
    tokens: Arc<TokenConfig>,
    renderer: Arc<dyn DocumentRenderer>,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, tokens: TokenConfig, renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            renderer,
        }
    }

    /// In-memory store plus the PDF renderer.
    pub fn in_memory(tokens: TokenConfig) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), tokens, Arc::new(PdfRenderer))
    }

    pub fn tokens(&self) -> Arc<TokenConfig> {
        self.tokens.clone()
    }

    // -------------------------
    // Session + users
    // -------------------------

    /// Seed the first operator account when no user exists yet.
    pub async fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> ServiceResult<Option<User>> {
        if self.store.count_users().await? > 0 {
            return Ok(None);
        }
        let user = self
            .register_user(Registration {
                username: admin.username.clone(),
                password: admin.password.clone(),
                password_confirmation: admin.password.clone(),
            })
            .await?;
        info!(username = %user.username, "seeded bootstrap administrator");
        Ok(Some(user))
    }

    /// Check credentials and issue a session token.
    pub async fn login(&self, username: &str, password: &str, now: DateTime<Utc>) -> ServiceResult<(String, User)> {
        let user = self
            .store
            .find_user_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        user.authenticate(password)?;
        let token = issue_token(&user, &self.tokens, now)?;
        info!(user_id = %user.id, "session opened");
        Ok((token, user))
    }

    pub async fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    pub async fn register_user(&self, form: Registration) -> ServiceResult<User> {
        let user = User::register(UserId::new(), form)?;
        self.store.insert_user(&user).await?;
        Ok(user)
    }

    pub async fn update_user(&self, id: UserId, form: UserUpdate) -> ServiceResult<User> {
        let mut user = self.store.get_user(id).await?;
        user.update(form)?;
        self.store.update_user(&user).await?;
        Ok(user)
    }

    /// Remove an account; the signed-in user cannot remove themselves.
    pub async fn delete_user(&self, id: UserId, acting: UserId) -> ServiceResult<()> {
        if id == acting {
            return Err(DomainError::conflict("cannot delete the signed-in user").into());
        }
        Ok(self.store.delete_user(id).await?)
    }

    // -------------------------
    // Clients
    // -------------------------

    pub async fn create_client(&self, details: ClientDetails) -> ServiceResult<Client> {
        let client = Client::register(ClientId::new(), details)?;
        self.store.insert_client(&client).await?;
        Ok(client)
    }

    pub async fn update_client(&self, id: ClientId, details: ClientDetails) -> ServiceResult<Client> {
        let mut client = self.store.get_client(id).await?;
        client.update(details)?;
        self.store.update_client(&client).await?;
        Ok(client)
    }

    pub async fn delete_client(&self, id: ClientId) -> ServiceResult<ClientRemoval> {
        let removed = self.store.delete_client(id).await?;
        info!(client_id = %id, orders = removed.orders, lines = removed.lines, "client deleted");
        Ok(removed)
    }

    pub async fn get_client(&self, id: ClientId) -> ServiceResult<Client> {
        Ok(self.store.get_client(id).await?)
    }

    pub async fn list_clients(&self, term: Option<&str>) -> ServiceResult<Vec<Client>> {
        Ok(self.store.list_clients(term).await?)
    }

    /// A client with its orders, newest first.
    pub async fn client_orders(&self, id: ClientId) -> ServiceResult<(Client, Vec<OrderDetail>)> {
        let client = self.store.get_client(id).await?;
        let orders = self.store.orders_for_client(id).await?;
        Ok((client, orders))
    }

    // -------------------------
    // Products
    // -------------------------

    pub async fn create_product(&self, input: NewProduct) -> ServiceResult<Product> {
        let product = Product::create(ProductId::new(), input)?;
        self.store.insert_product(&product).await?;
        Ok(product)
    }

    pub async fn update_product(&self, id: ProductId, input: ProductUpdate) -> ServiceResult<Product> {
        let mut product = self.store.get_product(id).await?;
        product.update(input)?;
        self.store.update_product(&product).await?;
        Ok(product)
    }

    /// Deleting a product also deletes every order line that referenced it,
    /// which changes the totals of those orders.
    pub async fn delete_product(&self, id: ProductId) -> ServiceResult<u64> {
        let removed_lines = self.store.delete_product(id).await?;
        if removed_lines > 0 {
            warn!(product_id = %id, removed_lines, "product deletion removed order lines");
        } else {
            info!(product_id = %id, "product deleted");
        }
        Ok(removed_lines)
    }

    pub async fn get_product(&self, id: ProductId) -> ServiceResult<Product> {
        Ok(self.store.get_product(id).await?)
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> ServiceResult<Vec<Product>> {
        Ok(self.store.list_products(filter).await?)
    }

    // -------------------------
    // Orders
    // -------------------------

    pub async fn create_order(&self, input: NewOrder, now: DateTime<Utc>) -> ServiceResult<OrderDetail> {
        self.store.get_client(input.client_id).await?;

        let requested: Vec<ProductId> = input.lines.iter().map(|l| l.product_id).collect();
        let known = self.store.existing_products(&requested).await?;
        let order = ServiceOrder::create(OrderId::new(), input, now, |p| known.contains(&p))?;

        self.store.insert_order(&order).await?;
        info!(order_id = %order.id, lines = order.lines.len(), "order opened");
        Ok(self.store.order_detail(order.id).await?)
    }

    pub async fn edit_order(&self, id: OrderId, edit: EditOrder) -> ServiceResult<(EditOutcome, OrderDetail)> {
        let mut order = self.store.get_order(id).await?;

        let requested: Vec<ProductId> = edit.add_line.iter().map(|l| l.product_id).collect();
        let known = self.store.existing_products(&requested).await?;
        let outcome = order.apply_edit(edit, |p| known.contains(&p))?;

        self.store.save_order(&order).await?;
        if let EditOutcome::LineRemoved(line) = &outcome {
            info!(order_id = %id, line_id = %line.id, "order line removed");
        }
        Ok((outcome, self.store.order_detail(id).await?))
    }

    pub async fn order_detail(&self, id: OrderId) -> ServiceResult<OrderDetail> {
        Ok(self.store.order_detail(id).await?)
    }

    pub async fn search_orders(&self, query: &OrderQuery) -> ServiceResult<Page<OrderDetail>> {
        Ok(self.store.search_orders(query).await?)
    }

    /// Orders whose status matches `raw`; an unrecognised status is a
    /// validation error here rather than an empty result.
    pub async fn orders_with_status(&self, raw: &str) -> ServiceResult<(OrderStatus, Vec<OrderDetail>)> {
        let status: OrderStatus = raw.parse()?;
        let orders = self.store.orders_with_status(status).await?;
        Ok((status, orders))
    }

    pub async fn render_order(&self, id: OrderId) -> ServiceResult<RenderedDocument> {
        let detail = self.store.order_detail(id).await?;
        let company = self.store.get_company().await?;
        let document = OrderDocument::build(&detail, company.as_ref());
        let bytes = self.renderer.render(&document)?;
        Ok(RenderedDocument {
            file_name: document.file_name(),
            content_type: self.renderer.content_type(),
            bytes,
        })
    }

    // -------------------------
    // Company
    // -------------------------

    pub async fn company(&self) -> ServiceResult<Option<CompanyProfile>> {
        Ok(self.store.get_company().await?)
    }

    pub async fn save_company(&self, details: CompanyDetails) -> ServiceResult<CompanyProfile> {
        let profile = CompanyProfile::from_details(details)?;
        self.store.save_company(&profile).await?;
        Ok(profile)
    }

    // -------------------------
    // Billing
    // -------------------------

    pub async fn dashboard(&self, now: DateTime<Utc>) -> ServiceResult<DashboardSummary> {
        let orders = self.store.all_orders().await?;
        let clients = self.store.count_clients().await?;
        Ok(DashboardSummary::build(&orders, clients, now))
    }

    pub async fn monthly_report(&self, period: MonthPeriod) -> ServiceResult<MonthlyReport> {
        let orders = self.store.orders_created_between(period.start(), period.end()).await?;
        Ok(MonthlyReport::build(period, &orders))
    }
}

/// Wire storage from configuration and seed the bootstrap admin.
pub async fn build_services(config: &AppConfig) -> ServiceResult<AppServices> {
    let tokens = TokenConfig::new(config.jwt_secret.clone(), config.session_ttl_minutes);

    let services = match config.database_url.as_deref() {
        Some(url) => {
            let store = PgStore::connect(url, config.database_max_connections).await?;
            store.migrate().await?;
            info!("using postgres store");
            AppServices::new(Arc::new(store), tokens, Arc::new(PdfRenderer))
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            AppServices::in_memory(tokens)
        }
    };

    if let Some(admin) = &config.bootstrap_admin {
        services.bootstrap_admin(admin).await?;
    }

    Ok(services)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use osdesk_core::Money;
    use osdesk_orders::NewLine;

    use super::*;

    fn services() -> AppServices {
        AppServices::in_memory(TokenConfig::new("test-secret", 30))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    async fn seed(s: &AppServices) -> (Client, Product) {
        let client = s
            .create_client(ClientDetails {
                name: "Maria".into(),
                tax_id: "123".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let product = s
            .create_product(NewProduct {
                name: "Troca de tela".into(),
                description: None,
                price: "10.00".into(),
                kind: "service".into(),
            })
            .await
            .unwrap();
        (client, product)
    }

    #[tokio::test]
    async fn bootstrap_admin_only_seeds_empty_table() {
        let s = services();
        let admin = BootstrapAdmin {
            username: "admin".into(),
            password: "admin123".into(),
        };
        assert!(s.bootstrap_admin(&admin).await.unwrap().is_some());
        assert!(s.bootstrap_admin(&admin).await.unwrap().is_none());
        assert_eq!(s.list_users().await.unwrap().len(), 1);

        let (token, user) = s.login("admin", "admin123", now()).await.unwrap();
        assert!(!token.is_empty());
        assert_eq!(user.username, "admin");
        assert!(matches!(
            s.login("admin", "nope", now()).await,
            Err(ServiceError::Auth(AuthError::InvalidCredentials))
        ));
        assert!(matches!(
            s.login("ghost", "admin123", now()).await,
            Err(ServiceError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn signed_in_user_cannot_delete_themselves() {
        let s = services();
        let admin = s
            .bootstrap_admin(&BootstrapAdmin {
                username: "admin".into(),
                password: "admin123".into(),
            })
            .await
            .unwrap()
            .unwrap();

        let err = s.delete_user(admin.id, admin.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Store(StoreError::Domain(DomainError::Conflict(ref m))) if m == "cannot delete the signed-in user"
        ));
        assert_eq!(s.list_users().await.unwrap().len(), 1);

        let other = s
            .register_user(Registration {
                username: "joana".into(),
                password: "segredo1".into(),
                password_confirmation: "segredo1".into(),
            })
            .await
            .unwrap();
        s.delete_user(other.id, admin.id).await.unwrap();
        assert_eq!(s.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_order_rejects_unknown_product_and_client() {
        let s = services();
        let (client, product) = seed(&s).await;

        let err = s
            .create_order(
                NewOrder {
                    client_id: client.id,
                    notes: None,
                    discount: Money::ZERO,
                    lines: vec![NewLine { product_id: ProductId::new(), quantity: 1 }],
                },
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::Domain(DomainError::Validation(_)))));

        let err = s
            .create_order(
                NewOrder {
                    client_id: ClientId::new(),
                    notes: None,
                    discount: Money::ZERO,
                    lines: vec![NewLine { product_id: product.id, quantity: 1 }],
                },
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::NotFound("client"))));
    }

    #[tokio::test]
    async fn deleting_product_reports_removed_lines() {
        let s = services();
        let (client, product) = seed(&s).await;
        let detail = s
            .create_order(
                NewOrder {
                    client_id: client.id,
                    notes: None,
                    discount: Money::ZERO,
                    lines: vec![NewLine { product_id: product.id, quantity: 2 }],
                },
                now(),
            )
            .await
            .unwrap();

        assert_eq!(s.delete_product(product.id).await.unwrap(), 1);
        let after = s.order_detail(detail.order.id).await.unwrap();
        assert!(after.lines.is_empty());
    }

    #[tokio::test]
    async fn status_listing_rejects_unknown_status() {
        let s = services();
        let err = s.orders_with_status("archived").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Store(StoreError::Domain(DomainError::Validation(ref m))) if m == "Invalid status"
        ));
        let (status, orders) = s.orders_with_status("PAGO").await.unwrap();
        assert_eq!(status, OrderStatus::Paid);
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn renders_pdf_with_order_file_name() {
        let s = services();
        let (client, product) = seed(&s).await;
        let detail = s
            .create_order(
                NewOrder {
                    client_id: client.id,
                    notes: Some("urgente".into()),
                    discount: Money::from_cents(100),
                    lines: vec![NewLine { product_id: product.id, quantity: 1 }],
                },
                now(),
            )
            .await
            .unwrap();

        let doc = s.render_order(detail.order.id).await.unwrap();
        assert_eq!(doc.content_type, "application/pdf");
        assert_eq!(doc.file_name, format!("os_{}.pdf", detail.order.id));
        assert!(doc.bytes.starts_with(b"%PDF"));
    }
}
