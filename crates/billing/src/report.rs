use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use osdesk_core::{Money, OrderId};
use osdesk_orders::{OrderDetail, OrderStatus};

use crate::period::MonthPeriod;
use crate::totals::{StatusBreakdown, order_total, sum_all};

/// Number of recent orders shown on the dashboard.
pub const RECENT_ORDERS: usize = 4;

/// Compact order row for dashboard listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentOrder {
    pub id: OrderId,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Money,
}

impl RecentOrder {
    pub fn from_detail(detail: &OrderDetail) -> Self {
        Self {
            id: detail.order.id,
            client_name: detail.client_name.clone(),
            created_at: detail.order.created_at,
            status: detail.order.status,
            total: order_total(detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_orders: usize,
    pub total_clients: usize,
    pub all_time: StatusBreakdown,
    pub month_to_date: StatusBreakdown,
    pub recent: Vec<RecentOrder>,
}

impl DashboardSummary {
    /// Summarise every order; month-to-date covers orders since the first
    /// day of `now`'s month.
    pub fn build(orders: &[OrderDetail], total_clients: usize, now: DateTime<Utc>) -> Self {
        let month_start = MonthPeriod::containing(now).start();
        let mut this_month: Vec<&OrderDetail> =
            orders.iter().filter(|d| d.order.created_at >= month_start).collect();
        this_month.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));

        Self {
            total_orders: orders.len(),
            total_clients,
            all_time: sum_all(orders),
            month_to_date: sum_all(this_month.iter().copied()),
            recent: this_month
                .iter()
                .take(RECENT_ORDERS)
                .map(|d| RecentOrder::from_detail(d))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyReport {
    pub period: MonthPeriod,
    pub breakdown: StatusBreakdown,
    pub order_count: usize,
    pub distinct_clients: usize,
}

impl MonthlyReport {
    /// Aggregate the orders created within `period`; others are ignored.
    pub fn build<'a>(period: MonthPeriod, orders: impl IntoIterator<Item = &'a OrderDetail>) -> Self {
        let in_period: Vec<&OrderDetail> = orders
            .into_iter()
            .filter(|d| period.contains(d.order.created_at))
            .collect();
        let clients: HashSet<_> = in_period.iter().map(|d| d.order.client_id).collect();
        let breakdown = sum_all(in_period.iter().copied());

        Self {
            period,
            order_count: breakdown.order_count,
            breakdown,
            distinct_clients: clients.len(),
        }
    }
}

/// Per-status sums over one page of search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub breakdown: StatusBreakdown,
}

impl SearchSummary {
    pub fn of<'a>(orders: impl IntoIterator<Item = &'a OrderDetail>) -> Self {
        Self {
            breakdown: sum_all(orders),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::totals::fixtures::order_at;
    use chrono::TimeZone;
    use osdesk_core::ClientId;

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_month_reports_zero() {
        let period = MonthPeriod::new(2025, 6).unwrap();
        let others = vec![order_at(&[(1, 1000)], 0, OrderStatus::Paid, ClientId::new(), at(5, 31))];
        let report = MonthlyReport::build(period, &others);

        assert_eq!(report.order_count, 0);
        assert_eq!(report.distinct_clients, 0);
        assert_eq!(report.breakdown, StatusBreakdown::default());
    }

    #[test]
    fn monthly_report_counts_distinct_clients() {
        let a = ClientId::new();
        let b = ClientId::new();
        let orders = vec![
            order_at(&[(1, 1000)], 0, OrderStatus::Paid, a, at(3, 1)),
            order_at(&[(2, 1000)], 0, OrderStatus::Open, a, at(3, 15)),
            order_at(&[(1, 500)], 0, OrderStatus::Paid, b, at(3, 31)),
            order_at(&[(1, 9999)], 0, OrderStatus::Paid, b, at(4, 1)),
        ];

        let report = MonthlyReport::build(MonthPeriod::new(2025, 3).unwrap(), &orders);
        assert_eq!(report.order_count, 3);
        assert_eq!(report.distinct_clients, 2);
        assert_eq!(report.breakdown.paid, Money::from_cents(1500));
        assert_eq!(report.breakdown.open, Money::from_cents(2000));
        assert_eq!(report.breakdown.total, Money::from_cents(3500));
    }

    #[test]
    fn dashboard_lists_four_newest_of_current_month() {
        let client = ClientId::new();
        let mut orders: Vec<_> = (1..=6)
            .map(|day| order_at(&[(1, 1000)], 0, OrderStatus::Open, client, at(7, day)))
            .collect();
        orders.push(order_at(&[(1, 7000)], 0, OrderStatus::Paid, client, at(6, 30)));

        let summary = DashboardSummary::build(&orders, 3, at(7, 20));

        assert_eq!(summary.total_orders, 7);
        assert_eq!(summary.total_clients, 3);
        assert_eq!(summary.all_time.total, Money::from_cents(13_000));
        assert_eq!(summary.all_time.paid, Money::from_cents(7000));
        assert_eq!(summary.month_to_date.total, Money::from_cents(6000));
        assert_eq!(summary.month_to_date.paid, Money::ZERO);

        let days: Vec<_> = summary.recent.iter().map(|r| r.created_at).collect();
        assert_eq!(days, vec![at(7, 6), at(7, 5), at(7, 4), at(7, 3)]);
    }

    #[test]
    fn search_summary_covers_given_rows() {
        let c = ClientId::new();
        let rows = vec![
            order_at(&[(1, 1000)], 0, OrderStatus::Canceled, c, at(1, 1)),
            order_at(&[(1, 2500)], 500, OrderStatus::Finished, c, at(1, 2)),
        ];
        let s = SearchSummary::of(&rows);
        assert_eq!(s.breakdown.canceled, Money::from_cents(1000));
        assert_eq!(s.breakdown.finished, Money::from_cents(2000));
        assert_eq!(s.breakdown.order_count, 2);
    }
}
