use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel::SqliteConnection;

use stockpile_core::catalog::{CatalogRepositoryTrait, NewProduct, Product, ProductCategory};
use stockpile_core::Result;

use super::model::ProductDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::products;
use crate::utils::chunk_for_sqlite;

pub struct CatalogRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CatalogRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        CatalogRepository { pool, writer }
    }
}

/// Loads products by id, chunked to stay under SQLite's parameter limit.
pub(crate) fn load_products_by_ids(
    conn: &mut SqliteConnection,
    product_ids: &[String],
) -> Result<Vec<Product>> {
    let mut rows = Vec::with_capacity(product_ids.len());
    for chunk in chunk_for_sqlite(product_ids) {
        rows.extend(
            products::table
                .filter(products::id.eq_any(chunk))
                .select(ProductDB::as_select())
                .load::<ProductDB>(conn)
                .map_err(StorageError::from)?,
        );
    }
    Ok(rows
        .into_iter()
        .map(Product::try_from)
        .collect::<std::result::Result<Vec<_>, StorageError>>()?)
}

#[async_trait]
impl CatalogRepositoryTrait for CatalogRepository {
    fn get_products(&self, category: Option<ProductCategory>) -> Result<Vec<Product>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = products::table.into_boxed();
        if let Some(category) = category {
            query = query.filter(products::category.eq(category.as_str()));
        }
        let rows = query
            .order(products::name.asc())
            .select(ProductDB::as_select())
            .load::<ProductDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .map(Product::try_from)
            .collect::<std::result::Result<Vec<_>, StorageError>>()?)
    }

    fn get_products_by_ids(&self, product_ids: &[String]) -> Result<Vec<Product>> {
        let mut conn = get_connection(&self.pool)?;
        load_products_by_ids(&mut conn, product_ids)
    }

    async fn upsert_products(&self, new_products: Vec<NewProduct>) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let now = Utc::now();
                let mut affected_rows = 0;
                for product in new_products {
                    let row = ProductDB::from_new(product, now);
                    affected_rows += diesel::insert_into(products::table)
                        .values(&row)
                        .on_conflict(products::id)
                        .do_update()
                        .set((
                            products::name.eq(excluded(products::name)),
                            products::description.eq(excluded(products::description)),
                            products::category.eq(excluded(products::category)),
                            products::caliber.eq(excluded(products::caliber)),
                            products::price.eq(excluded(products::price)),
                            products::stock_quantity.eq(excluded(products::stock_quantity)),
                            products::image_url.eq(excluded(products::image_url)),
                            products::updated_at.eq(excluded(products::updated_at)),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(affected_rows)
            })
            .await
    }
}
