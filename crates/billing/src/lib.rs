//! Billing aggregation for service orders.
//!
//! Everything here is pure: callers hand in fully materialised
//! [`OrderDetail`](osdesk_orders::OrderDetail) values and get sums back.
//! Amounts are fixed-point cents ([`Money`](osdesk_core::Money)), so repeated
//! summation never drifts.

pub mod period;
pub mod report;
pub mod totals;

pub use period::MonthPeriod;
pub use report::{DashboardSummary, MonthlyReport, RECENT_ORDERS, RecentOrder, SearchSummary};
pub use totals::{OrderTotals, StatusBreakdown, line_amount, order_total, order_totals, sum_all, sum_by_status};
