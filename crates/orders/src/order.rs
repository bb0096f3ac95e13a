use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use osdesk_core::error::optional_text;
use osdesk_core::{ClientId, DomainError, DomainResult, Money, OrderId, OrderLineId, ProductId};

use crate::status::OrderStatus;

/// One product/quantity pairing within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Service order record.
///
/// Lines keep insertion order; the order is not financially meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOrder {
    pub id: OrderId,
    pub client_id: ClientId,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub discount: Money,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
}

/// A requested line (product + raw quantity) before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Input for opening a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub client_id: ClientId,
    pub notes: Option<String>,
    pub discount: Money,
    pub lines: Vec<NewLine>,
}

/// Edit-form submission for an existing order.
///
/// Header fields (date, status, discount) are always applied. A line removal
/// short-circuits the rest of the edit; otherwise quantities are updated and
/// then an optional new line is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOrder {
    pub created_on: NaiveDate,
    pub status: OrderStatus,
    pub discount: Money,
    pub remove_line: Option<OrderLineId>,
    pub quantities: Vec<(OrderLineId, i64)>,
    pub add_line: Option<NewLine>,
}

/// What an edit ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    LineRemoved(OrderLine),
    Updated { added_line: Option<OrderLineId> },
}

/// Quantities are positive integers; anything else is a caller input error.
pub fn validate_quantity(quantity: i64) -> DomainResult<u32> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    u32::try_from(quantity).map_err(|_| DomainError::validation("quantity is too large"))
}

/// Parse the edit form's `YYYY-MM-DD` creation date.
pub fn parse_order_date(raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::validation("invalid date"))
}

impl ServiceOrder {
    /// A freshly opened order: status `open`, no lines.
    pub fn open(
        id: OrderId,
        client_id: ClientId,
        notes: Option<String>,
        discount: Money,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            client_id,
            created_at,
            notes: optional_text(notes),
            discount,
            status: OrderStatus::Open,
            lines: Vec::new(),
        }
    }

    /// Open an order and append the requested lines.
    ///
    /// `product_exists` is the caller's catalog lookup.
    pub fn create(
        id: OrderId,
        input: NewOrder,
        created_at: DateTime<Utc>,
        product_exists: impl Fn(ProductId) -> bool,
    ) -> DomainResult<Self> {
        let mut order = Self::open(id, input.client_id, input.notes, input.discount, created_at);
        for line in input.lines {
            if !product_exists(line.product_id) {
                return Err(DomainError::validation("unknown product"));
            }
            order.add_line(line.product_id, line.quantity)?;
        }
        Ok(order)
    }

    pub fn add_line(&mut self, product_id: ProductId, quantity: i64) -> DomainResult<OrderLineId> {
        let quantity = validate_quantity(quantity)?;
        let id = OrderLineId::new();
        self.lines.push(OrderLine { id, product_id, quantity });
        Ok(id)
    }

    /// Remove a line; it must belong to this order.
    pub fn remove_line(&mut self, line_id: OrderLineId) -> DomainResult<OrderLine> {
        let idx = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or_else(DomainError::not_found)?;
        Ok(self.lines.remove(idx))
    }

    pub fn set_quantity(&mut self, line_id: OrderLineId, quantity: i64) -> DomainResult<()> {
        let quantity = validate_quantity(quantity)?;
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(DomainError::not_found)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Apply an edit-form submission.
    ///
    /// Validation happens before any mutation, so a rejected edit leaves the
    /// order untouched.
    pub fn apply_edit(
        &mut self,
        edit: EditOrder,
        product_exists: impl Fn(ProductId) -> bool,
    ) -> DomainResult<EditOutcome> {
        if let Some(line_id) = edit.remove_line {
            if !self.lines.iter().any(|l| l.id == line_id) {
                return Err(DomainError::not_found());
            }
        } else {
            for (_, qty) in &edit.quantities {
                validate_quantity(*qty)?;
            }
            if let Some(line) = &edit.add_line {
                validate_quantity(line.quantity)?;
                if !product_exists(line.product_id) {
                    return Err(DomainError::validation("unknown product"));
                }
            }
        }

        self.created_at = edit.created_on.and_time(chrono::NaiveTime::MIN).and_utc();
        self.status = edit.status;
        self.discount = edit.discount;

        if let Some(line_id) = edit.remove_line {
            let removed = self.remove_line(line_id)?;
            return Ok(EditOutcome::LineRemoved(removed));
        }

        for (line_id, qty) in edit.quantities {
            // Quantities for lines that are not on this order are ignored.
            if self.lines.iter().any(|l| l.id == line_id) {
                self.set_quantity(line_id, qty)?;
            }
        }

        let added_line = match edit.add_line {
            Some(line) => Some(self.add_line(line.product_id, line.quantity)?),
            None => None,
        };

        Ok(EditOutcome::Updated { added_line })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    fn open_order() -> ServiceOrder {
        ServiceOrder::open(OrderId::new(), ClientId::new(), None, Money::ZERO, test_time())
    }

    fn edit(date: &str) -> EditOrder {
        EditOrder {
            created_on: parse_order_date(date).unwrap(),
            status: OrderStatus::InProgress,
            discount: Money::from_cents(300),
            remove_line: None,
            quantities: Vec::new(),
            add_line: None,
        }
    }

    #[test]
    fn open_order_starts_empty_and_open() {
        let order = open_order();
        assert_eq!(order.status, OrderStatus::Open);
        assert!(order.lines.is_empty());
        assert_eq!(order.discount, Money::ZERO);
    }

    #[test]
    fn add_line_rejects_non_positive_quantity() {
        let mut order = open_order();
        let err = order.add_line(ProductId::new(), 0).unwrap_err();
        assert_eq!(err, DomainError::validation("quantity must be positive"));
        assert!(order.add_line(ProductId::new(), -2).is_err());
        assert!(order.lines.is_empty());
    }

    #[test]
    fn create_rejects_unknown_products() {
        let known = ProductId::new();
        let input = NewOrder {
            client_id: ClientId::new(),
            notes: Some("troca".into()),
            discount: Money::ZERO,
            lines: vec![
                NewLine { product_id: known, quantity: 1 },
                NewLine { product_id: ProductId::new(), quantity: 1 },
            ],
        };
        let err = ServiceOrder::create(OrderId::new(), input, test_time(), |p| p == known).unwrap_err();
        assert_eq!(err, DomainError::validation("unknown product"));
    }

    #[test]
    fn create_keeps_line_insertion_order() {
        let (a, b) = (ProductId::new(), ProductId::new());
        let input = NewOrder {
            client_id: ClientId::new(),
            notes: None,
            discount: Money::from_cents(100),
            lines: vec![
                NewLine { product_id: b, quantity: 2 },
                NewLine { product_id: a, quantity: 1 },
            ],
        };
        let order = ServiceOrder::create(OrderId::new(), input, test_time(), |_| true).unwrap();
        let products: Vec<_> = order.lines.iter().map(|l| l.product_id).collect();
        assert_eq!(products, [b, a]);
        assert_eq!(order.status, OrderStatus::Open);
    }

    #[test]
    fn edit_updates_header_quantities_and_adds_line() {
        let mut order = open_order();
        let line = order.add_line(ProductId::new(), 1).unwrap();
        let new_product = ProductId::new();

        let mut e = edit("2025-04-01");
        e.quantities = vec![(line, 5), (OrderLineId::new(), 9)];
        e.add_line = Some(NewLine { product_id: new_product, quantity: 2 });

        let outcome = order.apply_edit(e, |_| true).unwrap();
        let EditOutcome::Updated { added_line: Some(added) } = outcome else {
            panic!("expected an added line");
        };

        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.discount, Money::from_cents(300));
        assert_eq!(order.created_at.date_naive(), parse_order_date("2025-04-01").unwrap());
        assert_eq!(order.lines[0].quantity, 5);
        assert_eq!(order.lines[1].id, added);
        assert_eq!(order.lines[1].product_id, new_product);
    }

    #[test]
    fn edit_with_removal_stops_after_removing() {
        let mut order = open_order();
        let keep = order.add_line(ProductId::new(), 1).unwrap();
        let drop = order.add_line(ProductId::new(), 3).unwrap();

        let mut e = edit("2025-03-14");
        e.remove_line = Some(drop);
        e.quantities = vec![(keep, 7)];
        e.add_line = Some(NewLine { product_id: ProductId::new(), quantity: 1 });

        let outcome = order.apply_edit(e, |_| true).unwrap();
        assert!(matches!(outcome, EditOutcome::LineRemoved(ref l) if l.id == drop));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, 1, "quantities are not touched on removal");
        assert_eq!(order.status, OrderStatus::InProgress, "header is still applied");
    }

    #[test]
    fn edit_removing_foreign_line_is_not_found_and_leaves_order_untouched() {
        let mut order = open_order();
        order.add_line(ProductId::new(), 1).unwrap();
        let before = order.clone();

        let mut e = edit("2025-03-14");
        e.remove_line = Some(OrderLineId::new());
        assert_eq!(order.apply_edit(e, |_| true).unwrap_err(), DomainError::NotFound);
        assert_eq!(order, before);
    }

    #[test]
    fn edit_with_bad_quantity_is_rejected_before_mutation() {
        let mut order = open_order();
        let line = order.add_line(ProductId::new(), 1).unwrap();
        let before = order.clone();

        let mut e = edit("2025-03-14");
        e.quantities = vec![(line, 0)];
        assert!(order.apply_edit(e, |_| true).is_err());
        assert_eq!(order, before);
    }

    #[test]
    fn parse_order_date_rejects_garbage() {
        assert_eq!(parse_order_date("14/03/2025").unwrap_err(), DomainError::validation("invalid date"));
        assert!(parse_order_date("2025-02-30").is_err());
    }
}
