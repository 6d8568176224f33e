//! Catalog module - products and unit price lookup.

mod catalog_model;
mod catalog_service;
mod catalog_traits;

pub use catalog_model::{NewProduct, PriceCatalog, Product, ProductCategory};
pub use catalog_service::CatalogService;
pub use catalog_traits::{CatalogRepositoryTrait, CatalogServiceTrait};
