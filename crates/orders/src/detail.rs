use std::collections::HashMap;

use serde::Serialize;

use osdesk_core::ProductId;
use osdesk_products::Product;

use crate::order::{OrderLine, ServiceOrder};

/// An order line joined with its catalog entry.
///
/// `product` is `None` when the referenced product no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDetail {
    pub line: OrderLine,
    pub product: Option<Product>,
}

/// Fully materialised order: the record, its client's name and resolved lines.
///
/// This is the shape repositories hand to billing, views and documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetail {
    pub order: ServiceOrder,
    pub client_name: String,
    pub lines: Vec<LineDetail>,
}

impl OrderDetail {
    /// Join an order's lines against a product lookup table.
    pub fn resolve(
        order: ServiceOrder,
        client_name: impl Into<String>,
        products: &HashMap<ProductId, Product>,
    ) -> Self {
        let lines = order
            .lines
            .iter()
            .map(|line| LineDetail {
                line: line.clone(),
                product: products.get(&line.product_id).cloned(),
            })
            .collect();

        Self {
            order,
            client_name: client_name.into(),
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use osdesk_core::{ClientId, Money, OrderId};
    use osdesk_products::ProductKind;

    #[test]
    fn resolve_leaves_missing_products_empty() {
        let known = Product {
            id: ProductId::new(),
            name: "Revisão".into(),
            description: None,
            unit_price: Money::from_cents(5000),
            kind: ProductKind::Service,
        };
        let mut order = ServiceOrder::open(OrderId::new(), ClientId::new(), None, Money::ZERO, Utc::now());
        order.add_line(known.id, 1).unwrap();
        order.add_line(ProductId::new(), 4).unwrap();

        let products = HashMap::from([(known.id, known.clone())]);
        let detail = OrderDetail::resolve(order, "Oficina", &products);

        assert_eq!(detail.lines.len(), 2);
        assert_eq!(detail.lines[0].product.as_ref(), Some(&known));
        assert_eq!(detail.lines[1].product, None);
        assert_eq!(detail.client_name, "Oficina");
    }
}
