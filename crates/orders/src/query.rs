//! Order search and pagination.

use serde::Serialize;

use crate::detail::OrderDetail;
use crate::status::OrderStatus;
use chrono::Datelike;

/// Page size of the order search screen.
pub const PER_PAGE: usize = 10;

/// Pagination parameters (1-based page index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Zero-based offset of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, PER_PAGE)
    }
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total_items: usize) -> Self {
        Self {
            items,
            page: pagination.page,
            per_page: pagination.per_page,
            total_items,
            total_pages: total_items.div_ceil(pagination.per_page),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Order search filters.
///
/// - `term`: case-insensitive substring of the client name or of the creation
///   timestamp rendered as `YYYY-MM-DD HH:MM:SS`.
/// - `status`: raw status filter; an unrecognised value matches nothing.
/// - `month`: creation month 1–12; out-of-range input is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub term: Option<String>,
    pub status: Option<String>,
    pub month: Option<u32>,
    pub pagination: Pagination,
}

impl OrderQuery {
    /// Build a query from raw query-string values.
    pub fn from_raw(
        term: Option<&str>,
        status: Option<&str>,
        month: Option<&str>,
        page: Option<usize>,
    ) -> Self {
        let clean = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
        let month = month
            .map(str::trim)
            .filter(|m| !m.is_empty() && m.chars().all(|c| c.is_ascii_digit()))
            .and_then(|m| m.parse::<u32>().ok())
            .filter(|m| (1..=12).contains(m));

        Self {
            term: clean(term),
            status: clean(status),
            month,
            pagination: Pagination::new(page.unwrap_or(1), PER_PAGE),
        }
    }

    /// The parsed status filter: `Ok(None)` when absent, `Err(())` when the
    /// filter is present but unrecognised.
    fn status_filter(&self) -> Result<Option<OrderStatus>, ()> {
        match self.status.as_deref() {
            None => Ok(None),
            Some(raw) => OrderStatus::parse(raw).map(Some).ok_or(()),
        }
    }

    pub fn matches(&self, detail: &OrderDetail) -> bool {
        match self.status_filter() {
            Err(()) => return false,
            Ok(Some(status)) if detail.order.status != status => return false,
            Ok(_) => {}
        }

        if let Some(month) = self.month {
            if detail.order.created_at.month() != month {
                return false;
            }
        }

        if let Some(term) = self.term.as_deref() {
            let term = term.to_lowercase();
            let stamp = detail.order.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
            if !detail.client_name.to_lowercase().contains(&term) && !stamp.contains(&term) {
                return false;
            }
        }

        true
    }

    /// Filter, order newest first and cut out the requested page.
    pub fn apply(&self, details: impl IntoIterator<Item = OrderDetail>) -> Page<OrderDetail> {
        let mut matching: Vec<OrderDetail> = details.into_iter().filter(|d| self.matches(d)).collect();
        matching.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(self.pagination.offset())
            .take(self.pagination.per_page)
            .collect();

        Page::new(items, self.pagination, total)
    }
}
