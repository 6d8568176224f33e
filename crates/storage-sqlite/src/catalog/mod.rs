//! SQLite storage implementation for the product catalog.

mod model;
mod repository;

pub use model::ProductDB;
pub use repository::CatalogRepository;
pub(crate) use repository::load_products_by_ids;
