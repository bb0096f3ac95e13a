use serde::Serialize;

use osdesk_core::Money;
use osdesk_orders::{LineDetail, OrderDetail, OrderStatus};

/// Subtotal, discount and final total of one order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

/// Amount contributed by one line; zero when its product is gone.
pub fn line_amount(line: &LineDetail) -> Money {
    line.product
        .as_ref()
        .map(|p| p.unit_price.times(line.line.quantity))
        .unwrap_or(Money::ZERO)
}

pub fn order_totals(detail: &OrderDetail) -> OrderTotals {
    let subtotal: Money = detail.lines.iter().map(line_amount).sum();
    let discount = detail.order.discount;

    OrderTotals {
        subtotal,
        discount,
        total: subtotal.saturating_sub(discount),
    }
}

/// `max(Σ quantity × price − discount, 0)`.
pub fn order_total(detail: &OrderDetail) -> Money {
    order_totals(detail).total
}

/// Sum of totals over orders whose status matches `status` (case-insensitive).
///
/// An unrecognised status matches nothing and yields zero.
pub fn sum_by_status<'a>(orders: impl IntoIterator<Item = &'a OrderDetail>, status: &str) -> Money {
    let Some(status) = OrderStatus::parse(status) else {
        return Money::ZERO;
    };

    orders
        .into_iter()
        .filter(|d| d.order.status == status)
        .map(order_total)
        .sum()
}

/// Grand total plus one bucket per status, computed in a single pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub total: Money,
    pub open: Money,
    pub in_progress: Money,
    pub finished: Money,
    pub canceled: Money,
    pub paid: Money,
    pub order_count: usize,
}

impl StatusBreakdown {
    pub fn get(&self, status: OrderStatus) -> Money {
        match status {
            OrderStatus::Open => self.open,
            OrderStatus::InProgress => self.in_progress,
            OrderStatus::Finished => self.finished,
            OrderStatus::Canceled => self.canceled,
            OrderStatus::Paid => self.paid,
        }
    }

    fn bucket_mut(&mut self, status: OrderStatus) -> &mut Money {
        match status {
            OrderStatus::Open => &mut self.open,
            OrderStatus::InProgress => &mut self.in_progress,
            OrderStatus::Finished => &mut self.finished,
            OrderStatus::Canceled => &mut self.canceled,
            OrderStatus::Paid => &mut self.paid,
        }
    }

    pub fn record(&mut self, status: OrderStatus, amount: Money) {
        let bucket = self.bucket_mut(status);
        *bucket = bucket.saturating_add(amount);
        self.total = self.total.saturating_add(amount);
        self.order_count += 1;
    }
}

pub fn sum_all<'a>(orders: impl IntoIterator<Item = &'a OrderDetail>) -> StatusBreakdown {
    orders.into_iter().fold(StatusBreakdown::default(), |mut acc, d| {
        acc.record(d.order.status, order_total(d));
        acc
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::order;
    use super::*;

    #[test]
    fn subtotal_minus_discount() {
        let d = order(&[(2, 1000), (1, 500)], 300, OrderStatus::Open);
        let t = order_totals(&d);
        assert_eq!(t.subtotal, Money::from_cents(2500));
        assert_eq!(t.total, Money::from_cents(2200));
        assert_eq!(t.total.to_string(), "22.00");
    }

    #[test]
    fn discount_larger_than_subtotal_clamps_to_zero() {
        let d = order(&[(1, 1000)], 1500, OrderStatus::Open);
        assert_eq!(order_total(&d), Money::ZERO);
    }

    #[test]
    fn empty_order_is_zero() {
        let d = order(&[], 0, OrderStatus::Open);
        let t = order_totals(&d);
        assert_eq!(t.subtotal, Money::ZERO);
        assert_eq!(t.total, Money::ZERO);
    }

    #[test]
    fn missing_product_contributes_nothing() {
        let mut d = order(&[(2, 1000), (3, 700)], 0, OrderStatus::Open);
        d.lines[1].product = None;
        assert_eq!(order_total(&d), Money::from_cents(2000));
    }

    #[test]
    fn sum_by_status_is_case_insensitive() {
        let orders = vec![
            order(&[(1, 1000)], 0, OrderStatus::Open),
            order(&[(1, 2000)], 0, OrderStatus::parse("paid").unwrap()),
            order(&[(1, 3000)], 0, OrderStatus::parse("PAID").unwrap()),
        ];

        assert_eq!(sum_by_status(&orders, "paid"), Money::from_cents(5000));
        assert_eq!(sum_by_status(&orders, "Pago"), Money::from_cents(5000));
        assert_eq!(sum_by_status(&orders, "OPEN"), Money::from_cents(1000));
        assert_eq!(sum_by_status(&orders, "canceled"), Money::ZERO);
    }

    #[test]
    fn unknown_status_sums_to_zero() {
        let orders = vec![order(&[(1, 1000)], 0, OrderStatus::Open)];
        assert_eq!(sum_by_status(&orders, "archived"), Money::ZERO);
    }

    #[test]
    fn sum_all_buckets_by_status() {
        let orders = vec![
            order(&[(1, 1000)], 0, OrderStatus::Open),
            order(&[(2, 1000)], 500, OrderStatus::InProgress),
            order(&[(1, 4000)], 0, OrderStatus::Paid),
            order(&[(1, 900)], 0, OrderStatus::Canceled),
        ];

        let b = sum_all(&orders);
        assert_eq!(b.order_count, 4);
        assert_eq!(b.open, Money::from_cents(1000));
        assert_eq!(b.in_progress, Money::from_cents(1500));
        assert_eq!(b.finished, Money::ZERO);
        assert_eq!(b.canceled, Money::from_cents(900));
        assert_eq!(b.paid, Money::from_cents(4000));
        assert_eq!(b.total, Money::from_cents(7400));
        assert_eq!(b.get(OrderStatus::Paid), b.paid);
    }

    #[test]
    fn empty_set_is_all_zero() {
        let b = sum_all(std::iter::empty());
        assert_eq!(b, StatusBreakdown::default());
    }

    #[test]
    fn repeated_cent_sums_do_not_drift() {
        // 0.10 + 0.20 summed a thousand times drifts under binary floats.
        let orders: Vec<_> = (0..1000)
            .flat_map(|_| [order(&[(1, 10)], 0, OrderStatus::Paid), order(&[(1, 20)], 0, OrderStatus::Paid)])
            .collect();

        let float_sum: f64 = (0..1000).map(|_| 0.1_f64 + 0.2_f64).sum();
        assert_ne!(float_sum, 300.0);

        let total = sum_all(&orders).total;
        assert_eq!(total, Money::from_cents(30_000));
        assert_eq!(total.to_string(), "300.00");
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::fixtures::order;
    use super::*;
    use proptest::prelude::*;

    fn lines() -> impl Strategy<Value = Vec<(u32, u64)>> {
        prop::collection::vec((1u32..50, 0u64..100_000), 0..8)
    }

    fn status() -> impl Strategy<Value = OrderStatus> {
        prop::sample::select(OrderStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn total_never_exceeds_subtotal(lines in lines(), discount in 0u64..1_000_000) {
            let t = order_totals(&order(&lines, discount, OrderStatus::Open));
            prop_assert!(t.total <= t.subtotal);
        }

        #[test]
        fn no_discount_total_equals_subtotal(lines in lines()) {
            let t = order_totals(&order(&lines, 0, OrderStatus::Open));
            prop_assert_eq!(t.total, t.subtotal);
        }

        #[test]
        fn discount_at_or_above_subtotal_is_zero(lines in lines(), extra in 0u64..10_000) {
            let subtotal = order_totals(&order(&lines, 0, OrderStatus::Open)).subtotal;
            let d = order(&lines, subtotal.cents() + extra, OrderStatus::Open);
            prop_assert_eq!(order_total(&d), Money::ZERO);
        }

        #[test]
        fn removing_a_line_reduces_subtotal_by_its_amount(lines in lines(), pick in any::<prop::sample::Index>()) {
            prop_assume!(!lines.is_empty());
            let mut d = order(&lines, 0, OrderStatus::Open);
            let before = order_totals(&d).subtotal;
            let removed = d.lines.remove(pick.index(d.lines.len()));
            let after = order_totals(&d).subtotal;
            prop_assert_eq!(before.cents() - after.cents(), line_amount(&removed).cents());
        }

        #[test]
        fn deleted_product_drops_only_its_line(lines in lines(), pick in any::<prop::sample::Index>()) {
            prop_assume!(!lines.is_empty());
            let mut d = order(&lines, 0, OrderStatus::Open);
            let before = order_totals(&d).subtotal;
            let i = pick.index(d.lines.len());
            let priced = line_amount(&d.lines[i]);

            d.lines[i].product = None;
            prop_assert_eq!(line_amount(&d.lines[i]), Money::ZERO);
            let after = order_totals(&d).subtotal;
            prop_assert_eq!(before.cents() - after.cents(), priced.cents());
        }

        #[test]
        fn status_buckets_add_up_to_total(
            specs in prop::collection::vec((lines(), 0u64..50_000, status()), 0..12)
        ) {
            let orders: Vec<_> = specs.iter().map(|(l, disc, s)| order(l, *disc, *s)).collect();
            let b = sum_all(&orders);
            let buckets: Money = OrderStatus::ALL.iter().map(|s| b.get(*s)).sum();
            prop_assert_eq!(buckets, b.total);
            for s in OrderStatus::ALL {
                prop_assert_eq!(sum_by_status(&orders, s.as_str()), b.get(s));
            }
        }
    }
}
