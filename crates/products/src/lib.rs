//! Products domain module: the catalog of products and services that service
//! order lines reference.
//!
//! Pure domain logic (no IO, no HTTP, no storage).

pub mod product;

pub use product::{NewProduct, Product, ProductFilter, ProductKind, ProductUpdate};
