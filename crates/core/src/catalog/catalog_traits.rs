use crate::catalog::catalog_model::{NewProduct, PriceCatalog, Product, ProductCategory};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for catalog repository operations
#[async_trait]
pub trait CatalogRepositoryTrait: Send + Sync {
    fn get_products(&self, category: Option<ProductCategory>) -> Result<Vec<Product>>;
    fn get_products_by_ids(&self, product_ids: &[String]) -> Result<Vec<Product>>;
    async fn upsert_products(&self, products: Vec<NewProduct>) -> Result<usize>;
}

/// Trait for catalog service operations
#[async_trait]
pub trait CatalogServiceTrait: Send + Sync {
    fn list_products(&self, category: Option<ProductCategory>) -> Result<Vec<Product>>;
    fn price_catalog(&self, product_ids: &[String]) -> Result<PriceCatalog>;
    async fn seed_products(&self, products: Vec<NewProduct>) -> Result<usize>;
}
