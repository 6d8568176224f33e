use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use super::catalog_model::{NewProduct, PriceCatalog, Product, ProductCategory};
use super::catalog_traits::{CatalogRepositoryTrait, CatalogServiceTrait};
use crate::errors::Result;

pub struct CatalogService {
    repository: Arc<dyn CatalogRepositoryTrait>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn CatalogRepositoryTrait>) -> Self {
        CatalogService { repository }
    }
}

#[async_trait]
impl CatalogServiceTrait for CatalogService {
    fn list_products(&self, category: Option<ProductCategory>) -> Result<Vec<Product>> {
        self.repository.get_products(category)
    }

    fn price_catalog(&self, product_ids: &[String]) -> Result<PriceCatalog> {
        // Duplicate ids in a batch only need one lookup
        let unique: Vec<String> = product_ids
            .iter()
            .filter(|id| !id.trim().is_empty())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if unique.is_empty() {
            return Ok(PriceCatalog::new());
        }
        let products = self.repository.get_products_by_ids(&unique)?;
        debug!(
            "Resolved {} of {} requested product prices",
            products.len(),
            unique.len()
        );
        Ok(products.iter().collect())
    }

    async fn seed_products(&self, products: Vec<NewProduct>) -> Result<usize> {
        for product in &products {
            product.validate()?;
        }
        let count = self.repository.upsert_products(products).await?;
        info!("Seeded {} catalog products", count);
        Ok(count)
    }
}
