//! Parties domain module: the business's clients and its own company profile.
//!
//! Pure domain records and validation (no IO, no HTTP, no storage).

pub mod client;
pub mod company;

pub use client::{Client, ClientDetails, sort_by_name};
pub use company::{CompanyDetails, CompanyProfile};
