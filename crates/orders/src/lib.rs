//! Service orders ("OS") domain module.
//!
//! An order bundles a client, line items, a flat discount and a status label.
//! This crate holds the order record, its editing rules, the materialised
//! `OrderDetail` read shape and the search/pagination query. Pure domain logic
//! (no IO, no HTTP, no storage).

pub mod detail;
pub mod order;
pub mod query;
pub mod status;

pub use detail::{LineDetail, OrderDetail};
pub use order::{
    EditOrder, EditOutcome, NewLine, NewOrder, OrderLine, ServiceOrder, parse_order_date,
    validate_quantity,
};
pub use query::{OrderQuery, PER_PAGE, Page, Pagination};
pub use status::OrderStatus;
