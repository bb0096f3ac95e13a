use serde::Serialize;

use osdesk_billing::{line_amount, order_totals};
use osdesk_core::Money;
use osdesk_orders::OrderDetail;
use osdesk_parties::CompanyProfile;

/// One printed line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRow {
    pub description: String,
    pub quantity: u32,
    pub unit_price: Option<Money>,
    pub line_total: Money,
}

/// Everything printed on a service-order sheet, already formatted-ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDocument {
    pub company: Option<CompanyProfile>,
    pub order_id: String,
    pub issued_on: String,
    pub status: &'static str,
    pub client_name: String,
    pub notes: Option<String>,
    pub rows: Vec<DocumentRow>,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

/// Placeholder description for lines whose product has been removed.
const MISSING_PRODUCT: &str = "(produto removido)";

impl OrderDocument {
    pub fn build(detail: &OrderDetail, company: Option<&CompanyProfile>) -> Self {
        let totals = order_totals(detail);
        let rows = detail
            .lines
            .iter()
            .map(|l| DocumentRow {
                description: l
                    .product
                    .as_ref()
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| MISSING_PRODUCT.to_string()),
                quantity: l.line.quantity,
                unit_price: l.product.as_ref().map(|p| p.unit_price),
                line_total: line_amount(l),
            })
            .collect();

        Self {
            company: company.cloned(),
            order_id: detail.order.id.to_string(),
            issued_on: detail.order.created_at.format("%d/%m/%Y").to_string(),
            status: detail.order.status.label(),
            client_name: detail.client_name.clone(),
            notes: detail.order.notes.clone(),
            rows,
            subtotal: totals.subtotal,
            discount: totals.discount,
            total: totals.total,
        }
    }

    /// `inline` download name served with the PDF.
    pub fn file_name(&self) -> String {
        format!("os_{}.pdf", self.order_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use osdesk_core::{ClientId, OrderId, ProductId};
    use osdesk_orders::{OrderStatus, ServiceOrder};
    use osdesk_products::{Product, ProductKind};

    use super::*;

    pub(crate) fn sample_detail() -> OrderDetail {
        let p1 = Product {
            id: ProductId::new(),
            name: "Troca de óleo".into(),
            description: None,
            unit_price: Money::from_cents(1000),
            kind: ProductKind::Service,
        };
        let p2 = Product {
            id: ProductId::new(),
            name: "Filtro".into(),
            description: None,
            unit_price: Money::from_cents(500),
            kind: ProductKind::Product,
        };

        let mut order = ServiceOrder::open(
            OrderId::new(),
            ClientId::new(),
            Some("Cliente aguarda".into()),
            Money::from_cents(300),
            Utc.with_ymd_and_hms(2025, 3, 9, 14, 30, 0).unwrap(),
        );
        order.status = OrderStatus::InProgress;
        order.add_line(p1.id, 2).unwrap();
        order.add_line(p2.id, 1).unwrap();
        order.add_line(ProductId::new(), 7).unwrap();

        let products = HashMap::from([(p1.id, p1), (p2.id, p2)]);
        OrderDetail::resolve(order, "Oficina do Zé", &products)
    }

    #[test]
    fn build_collects_rows_and_totals() {
        let detail = sample_detail();
        let doc = OrderDocument::build(&detail, None);

        assert_eq!(doc.rows.len(), 3);
        assert_eq!(doc.rows[0].line_total, Money::from_cents(2000));
        assert_eq!(doc.rows[2].description, MISSING_PRODUCT);
        assert_eq!(doc.rows[2].unit_price, None);
        assert_eq!(doc.rows[2].line_total, Money::ZERO);
        assert_eq!(doc.subtotal, Money::from_cents(2500));
        assert_eq!(doc.total, Money::from_cents(2200));
        assert_eq!(doc.issued_on, "09/03/2025");
        assert_eq!(doc.status, "Em andamento");
        assert_eq!(doc.file_name(), format!("os_{}.pdf", detail.order.id));
    }
}
