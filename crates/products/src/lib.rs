//! Products catalog module.
//!
//! Reference data only: the catalog is owned by an outside collaborator and the
//! valuation engine reads it. No IO, no HTTP, no storage.

pub mod product;

pub use product::{Catalog, Product, ProductRecord};
