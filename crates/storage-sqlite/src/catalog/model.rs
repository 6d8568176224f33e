//! Database models for products.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::errors::StorageError;
use crate::utils::{format_decimal, format_timestamp, parse_decimal, parse_timestamp};
use stockpile_core::catalog::{NewProduct, Product, ProductCategory};

/// Database model for products
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductDB {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub caliber: Option<String>,
    pub price: String,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProductDB {
    pub fn from_new(product: NewProduct, now: DateTime<Utc>) -> Self {
        let timestamp = format_timestamp(now);
        ProductDB {
            id: product.id,
            name: product.name,
            description: product.description,
            category: product.category.as_str().to_string(),
            caliber: product.caliber,
            price: format_decimal(product.price),
            stock_quantity: product.stock_quantity,
            image_url: product.image_url,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        }
    }
}

impl TryFrom<ProductDB> for Product {
    type Error = StorageError;

    fn try_from(db: ProductDB) -> Result<Self, Self::Error> {
        let category = db
            .category
            .parse::<ProductCategory>()
            .map_err(|e| StorageError::corrupt("products.category", &db.category, e))?;
        Ok(Product {
            price: parse_decimal("products.price", &db.price)?,
            created_at: parse_timestamp("products.created_at", &db.created_at)?,
            updated_at: parse_timestamp("products.updated_at", &db.updated_at)?,
            id: db.id,
            name: db.name,
            description: db.description,
            category,
            caliber: db.caliber,
            stock_quantity: db.stock_quantity,
            image_url: db.image_url,
        })
    }
}
