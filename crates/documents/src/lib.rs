//! Printable service-order documents.

pub mod document;
pub mod pdf;

pub use document::{DocumentRow, OrderDocument};
pub use pdf::{DocumentRenderer, PdfRenderer, RenderError};
