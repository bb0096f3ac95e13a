use serde::Deserialize;
use serde_json::{Value, json};

use osdesk_billing::{line_amount, order_totals};
use osdesk_core::{DomainError, DomainResult, Money, OrderLineId};
use osdesk_orders::{EditOrder, NewLine, NewOrder, OrderDetail, OrderStatus, Page, parse_order_date};
use osdesk_products::{ProductFilter, ProductKind};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub client_id: String,
    pub notes: Option<String>,
    /// Decimal text; blank or absent means no discount.
    pub discount: Option<String>,
    #[serde(default)]
    pub lines: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct LineQuantityRequest {
    pub line_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct EditOrderRequest {
    /// `YYYY-MM-DD`.
    pub created_on: String,
    pub status: String,
    pub discount: Option<String>,
    pub remove_line: Option<String>,
    #[serde(default)]
    pub quantities: Vec<LineQuantityRequest>,
    pub add_line: Option<OrderLineRequest>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderSearchParams {
    pub q: Option<String>,
    pub status: Option<String>,
    pub month: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientListParams {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub name: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthlyReportParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

fn parse_discount(raw: Option<&str>) -> DomainResult<Money> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Money::ZERO),
        Some(s) => s.parse().map_err(|_| DomainError::validation("invalid discount")),
    }
}

impl OrderLineRequest {
    fn into_domain(self) -> DomainResult<NewLine> {
        Ok(NewLine {
            product_id: self.product_id.parse()?,
            quantity: self.quantity,
        })
    }
}

impl CreateOrderRequest {
    pub fn into_domain(self) -> DomainResult<NewOrder> {
        Ok(NewOrder {
            client_id: self.client_id.parse()?,
            discount: parse_discount(self.discount.as_deref())?,
            notes: self.notes,
            lines: self
                .lines
                .into_iter()
                .map(OrderLineRequest::into_domain)
                .collect::<DomainResult<Vec<_>>>()?,
        })
    }
}

impl EditOrderRequest {
    pub fn into_domain(self) -> DomainResult<EditOrder> {
        let remove_line = match self.remove_line.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(raw.parse::<OrderLineId>()?),
            _ => None,
        };
        let quantities = self
            .quantities
            .into_iter()
            .map(|q| -> DomainResult<(OrderLineId, i64)> { Ok((q.line_id.parse()?, q.quantity)) })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(EditOrder {
            created_on: parse_order_date(&self.created_on)?,
            status: self.status.parse::<OrderStatus>()?,
            discount: parse_discount(self.discount.as_deref())?,
            remove_line,
            quantities,
            add_line: self.add_line.map(OrderLineRequest::into_domain).transpose()?,
        })
    }
}

impl ProductListParams {
    pub fn into_filter(self) -> Result<ProductFilter, axum::response::Response> {
        let kind = match self.kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            Some(raw) => Some(raw.parse::<ProductKind>().map_err(errors::domain_error_to_response)?),
            None => None,
        };
        Ok(ProductFilter {
            name: self.name.filter(|n| !n.trim().is_empty()),
            kind,
        })
    }
}

// -------------------------
// JSON mapping
// -------------------------

/// Full order view: header, resolved lines and totals.
pub fn order_detail_to_json(detail: &OrderDetail) -> Value {
    let totals = order_totals(detail);
    let order = &detail.order;
    let lines = detail
        .lines
        .iter()
        .map(|l| {
            json!({
                "id": l.line.id,
                "product_id": l.line.product_id,
                "product": l.product.as_ref().map(|p| json!({
                    "name": p.name,
                    "kind": p.kind,
                    "unit_price": p.unit_price,
                })),
                "quantity": l.line.quantity,
                "amount": line_amount(l),
            })
        })
        .collect::<Vec<_>>();

    json!({
        "id": order.id,
        "client_id": order.client_id,
        "client_name": detail.client_name,
        "created_at": order.created_at,
        "status": order.status,
        "status_label": order.status.label(),
        "notes": order.notes,
        "lines": lines,
        "subtotal": totals.subtotal,
        "discount": totals.discount,
        "total": totals.total,
    })
}

/// Compact row used by listings.
pub fn order_summary_to_json(detail: &OrderDetail) -> Value {
    let totals = order_totals(detail);
    json!({
        "id": detail.order.id,
        "client_name": detail.client_name,
        "created_at": detail.order.created_at,
        "status": detail.order.status,
        "status_label": detail.order.status.label(),
        "subtotal": totals.subtotal,
        "total": totals.total,
    })
}

pub fn page_to_json(page: &Page<OrderDetail>) -> Value {
    json!({
        "items": page.items.iter().map(order_summary_to_json).collect::<Vec<_>>(),
        "page": page.page,
        "per_page": page.per_page,
        "total_items": page.total_items,
        "total_pages": page.total_pages,
        "has_next": page.has_next(),
        "has_prev": page.has_prev(),
    })
}

#[cfg(test)]
mod tests {
    use osdesk_core::{ClientId, ProductId};

    use super::*;

    #[test]
    fn create_request_parses_ids_and_discount() {
        let product = ProductId::new();
        let req = CreateOrderRequest {
            client_id: ClientId::new().to_string(),
            notes: Some("  ".into()),
            discount: Some("2,50".into()),
            lines: vec![OrderLineRequest { product_id: product.to_string(), quantity: 3 }],
        };
        let order = req.into_domain().unwrap();
        assert_eq!(order.discount, Money::from_cents(250));
        assert_eq!(order.lines[0].product_id, product);
        assert_eq!(order.lines[0].quantity, 3);
    }

    #[test]
    fn blank_discount_is_zero_and_garbage_is_rejected() {
        assert_eq!(parse_discount(None).unwrap(), Money::ZERO);
        assert_eq!(parse_discount(Some(" ")).unwrap(), Money::ZERO);
        assert_eq!(parse_discount(Some("abc")).unwrap_err(), DomainError::validation("invalid discount"));
    }

    #[test]
    fn edit_request_validates_status_and_date() {
        let base = || EditOrderRequest {
            created_on: "2025-03-14".into(),
            status: "paid".into(),
            discount: None,
            remove_line: Some(String::new()),
            quantities: vec![LineQuantityRequest { line_id: OrderLineId::new().to_string(), quantity: 2 }],
            add_line: None,
        };

        let edit = base().into_domain().unwrap();
        assert_eq!(edit.status, OrderStatus::Paid);
        assert_eq!(edit.remove_line, None);
        assert_eq!(edit.quantities.len(), 1);

        let mut bad_status = base();
        bad_status.status = "archived".into();
        assert_eq!(bad_status.into_domain().unwrap_err(), DomainError::validation("Invalid status"));

        let mut bad_date = base();
        bad_date.created_on = "14/03/2025".into();
        assert_eq!(bad_date.into_domain().unwrap_err(), DomainError::validation("invalid date"));
    }

    #[test]
    fn product_params_parse_kind() {
        let filter = ProductListParams { name: Some("".into()), kind: Some("serviço".into()) }
            .into_filter()
            .unwrap();
        assert_eq!(filter.kind, Some(ProductKind::Service));
        assert_eq!(filter.name, None);

        assert!(ProductListParams { name: None, kind: Some("gadget".into()) }.into_filter().is_err());
    }
}
